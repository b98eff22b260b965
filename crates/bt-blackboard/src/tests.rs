//! Unit tests for bt-blackboard.

use std::sync::Arc;

use bt_core::{AgentId, EntityId, TemplateId, Timestamp, Vec2, Vec3, VarKey};

use crate::{
    AgentBlackboard, BlackboardLayout, VarFlags, VariableDefinition, VariableRegistry,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HUNGER: VarKey = VarKey::from_name("hunger");
const SPEED: VarKey = VarKey::from_name("speed");
const HOME: VarKey = VarKey::from_name("home");
const AT_WORK: VarKey = VarKey::from_name("at_work");
const MOOD: VarKey = VarKey::from_name("mood");
const EMPLOYER: VarKey = VarKey::from_name("employer");
const HEADING: VarKey = VarKey::from_name("heading");

/// A layout covering every variable type, for a 4-node template.
fn citizen_layout() -> Arc<BlackboardLayout> {
    let mut reg = VariableRegistry::new(16);
    reg.define(VariableDefinition::new("hunger", 10_i32).with_range(0.0, 100.0)).unwrap();
    reg.define(VariableDefinition::new("speed", 1.5_f32)).unwrap();
    reg.define(VariableDefinition::new("home", Vec3::new(1.0, 2.0, 0.0))).unwrap();
    reg.define(VariableDefinition::new("at_work", false)).unwrap();
    reg.define(VariableDefinition::string("mood", 8, "calm")).unwrap();
    reg.define(VariableDefinition::new("employer", EntityId(9))).unwrap();
    reg.define(VariableDefinition::new("heading", Vec2::new(0.0, 1.0))).unwrap();
    Arc::new(reg.build_layout(TemplateId(0), 4))
}

fn blackboard() -> AgentBlackboard {
    AgentBlackboard::new(AgentId(1), citizen_layout())
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;
    use crate::{BlackboardError, MAX_STRING_CAPACITY, VarType};

    #[test]
    fn define_returns_name_hash() {
        let mut reg = VariableRegistry::new(4);
        let key = reg.define(VariableDefinition::new("hunger", 0_i32)).unwrap();
        assert_eq!(key, HUNGER);
        assert_eq!(reg.get(HUNGER).unwrap().ty, VarType::Int);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut reg = VariableRegistry::new(4);
        reg.define(VariableDefinition::new("hunger", 0_i32)).unwrap();
        let err = reg.define(VariableDefinition::new("hunger", 1.0_f32)).unwrap_err();
        assert!(matches!(err, BlackboardError::DuplicateVariable { .. }));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn capacity_enforced() {
        let mut reg = VariableRegistry::new(1);
        reg.define(VariableDefinition::new("a", true)).unwrap();
        assert_eq!(
            reg.define(VariableDefinition::new("b", true)),
            Err(BlackboardError::VariableCapacity { limit: 1 })
        );
    }

    #[test]
    fn inconsistent_definitions_rejected() {
        let mut reg = VariableRegistry::new(8);
        // Declared type disagrees with default.
        let bad_type = VariableDefinition::declare("x", VarType::Float, 4, 1_i32);
        assert!(matches!(reg.define(bad_type), Err(BlackboardError::InvalidDefinition(_))));
        // Wrong fixed size.
        let bad_size = VariableDefinition::declare("y", VarType::Int, 8, 1_i32);
        assert!(matches!(reg.define(bad_size), Err(BlackboardError::InvalidDefinition(_))));
        // Range on a bool.
        let bad_range = VariableDefinition::new("z", true).with_range(0.0, 1.0);
        assert!(matches!(reg.define(bad_range), Err(BlackboardError::InvalidDefinition(_))));
        // min > max.
        let inverted = VariableDefinition::new("w", 0.5_f32).with_range(1.0, 0.0);
        assert!(matches!(reg.define(inverted), Err(BlackboardError::InvalidDefinition(_))));
        // Default outside range.
        let outside = VariableDefinition::new("v", 50_i32).with_range(0.0, 10.0);
        assert!(matches!(reg.define(outside), Err(BlackboardError::InvalidDefinition(_))));
        // String default longer than capacity.
        let long = VariableDefinition::string("s", 2, "abc");
        assert!(matches!(reg.define(long), Err(BlackboardError::InvalidDefinition(_))));
        // String default that could not be read back.
        let nul = VariableDefinition::string("t", 8, "a\0b");
        assert!(matches!(reg.define(nul), Err(BlackboardError::InvalidDefinition(_))));
        // Capacity beyond the cap.
        let huge = VariableDefinition::string("u", u32::MAX, "");
        assert!(matches!(reg.define(huge), Err(BlackboardError::InvalidDefinition(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn largest_strings_still_lay_out() {
        let mut reg = VariableRegistry::new(64);
        for i in 0..64 {
            reg.define(VariableDefinition::string(format!("s{i}"), MAX_STRING_CAPACITY, "")).unwrap();
        }
        let layout = reg.build_layout(TemplateId(0), 1);
        let last = layout.slot(VarKey::from_name("s63")).unwrap();
        assert_eq!(last.offset, 63 * MAX_STRING_CAPACITY);
    }

    #[test]
    fn explicit_declaration_accepted() {
        let mut reg = VariableRegistry::new(2);
        let key = reg.define(VariableDefinition::declare("speed", VarType::Float, 4, 2.0_f32)).unwrap();
        assert_eq!(key, SPEED);
    }

    #[test]
    fn offsets_are_aligned_and_disjoint() {
        let layout = citizen_layout();
        let mut ranges: Vec<_> = layout
            .variables()
            .iter()
            .map(|d| layout.slot(d.key).unwrap().range())
            .collect();
        for r in &ranges {
            assert_eq!(r.start % 4, 0, "slot {r:?} not 4-byte aligned");
        }
        ranges.sort_by_key(|r| r.start);
        for pair in ranges.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap: {pair:?}");
        }
        assert!(layout.var_segment_size() >= ranges.last().unwrap().end);
    }

    #[test]
    fn instance_size_accounts_for_nodes() {
        let layout = citizen_layout();
        let without_nodes = VariableRegistry::new(1).build_layout(TemplateId(0), 0);
        assert!(layout.instance_size() > layout.var_segment_size());
        assert_eq!(
            layout.instance_size() - layout.var_segment_size(),
            without_nodes.instance_size() + 4 * std::mem::size_of::<crate::NodeInstance>()
        );
    }

    #[test]
    fn unknown_slot_is_none() {
        let layout = citizen_layout();
        assert!(layout.slot(VarKey::from_name("nope")).is_none());
        assert!(layout.definition(VarKey::from_name("nope")).is_none());
    }
}

// ── Blackboard ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod blackboard {
    use super::*;
    use crate::{BlackboardError, NodeInstance, VarType, VarValue};
    use bt_core::{NodeIndex, NodeState};

    #[test]
    fn spawns_with_defaults_and_reset_instances() {
        let bb = blackboard();
        assert_eq!(bb.agent_id(), AgentId(1));
        assert_eq!(bb.template_id(), TemplateId(0));
        assert_eq!(bb.get::<i32>(HUNGER), Some(10));
        assert_eq!(bb.get::<f32>(SPEED), Some(1.5));
        assert_eq!(bb.get::<Vec3>(HOME), Some(Vec3::new(1.0, 2.0, 0.0)));
        assert_eq!(bb.get::<bool>(AT_WORK), Some(false));
        assert_eq!(bb.get::<EntityId>(EMPLOYER), Some(EntityId(9)));
        assert_eq!(bb.get::<Vec2>(HEADING), Some(Vec2::new(0.0, 1.0)));
        assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("calm".into())));
        assert_eq!(bb.instances().len(), 4);
        for inst in bb.instances() {
            assert_eq!(*inst, NodeInstance::RESET);
            assert_eq!(inst.state, NodeState::Invalid);
            assert_eq!(inst.current_child, NodeIndex::NONE);
            assert_eq!(inst.execution_count, 0);
        }
    }

    #[test]
    fn typed_set_updates_value_and_timestamp() {
        let mut bb = blackboard();
        bb.set(SPEED, 3.25_f32, Timestamp(500)).unwrap();
        assert_eq!(bb.get::<f32>(SPEED), Some(3.25));
        assert_eq!(bb.last_update(), Timestamp(500));
    }

    #[test]
    fn typed_get_with_wrong_type_is_none() {
        let bb = blackboard();
        assert_eq!(bb.get::<f32>(HUNGER), None);
        assert_eq!(bb.get::<i32>(VarKey::from_name("missing")), None);
    }

    #[test]
    fn unknown_variable_rejected() {
        let mut bb = blackboard();
        let key = VarKey::from_name("missing");
        assert_eq!(
            bb.set_variable(key, &VarValue::Int(1), Timestamp(1)),
            Err(BlackboardError::UnknownVariable(key))
        );
        assert_eq!(
            bb.set_raw(key, VarType::Int, &[0; 4], Timestamp(1)),
            Err(BlackboardError::UnknownVariable(key))
        );
        assert_eq!(bb.last_update(), Timestamp::ZERO);
    }

    #[test]
    fn type_mismatch_rejected_without_write() {
        let mut bb = blackboard();
        let err = bb.set_variable(HUNGER, &VarValue::Float(1.0), Timestamp(1)).unwrap_err();
        assert_eq!(
            err,
            BlackboardError::TypeMismatch { key: HUNGER, expected: VarType::Int, got: VarType::Float }
        );
        assert_eq!(bb.get::<i32>(HUNGER), Some(10));
        assert!(bb.set(HUNGER, true, Timestamp(1)).is_err());
    }

    #[test]
    fn numeric_writes_are_clamped() {
        let mut bb = blackboard();
        bb.set(HUNGER, 250_i32, Timestamp(1)).unwrap();
        assert_eq!(bb.get::<i32>(HUNGER), Some(100));
        bb.set_variable(HUNGER, &VarValue::Int(-4), Timestamp(2)).unwrap();
        assert_eq!(bb.get::<i32>(HUNGER), Some(0));
        bb.set_raw(HUNGER, VarType::Int, &(1_000_i32).to_le_bytes(), Timestamp(3)).unwrap();
        assert_eq!(bb.get::<i32>(HUNGER), Some(100));
    }

    #[test]
    fn strings_respect_capacity() {
        let mut bb = blackboard();
        bb.set_variable(MOOD, &"angry".into(), Timestamp(1)).unwrap();
        assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("angry".into())));
        // Shorter write must not leave a tail of the previous value.
        bb.set_variable(MOOD, &"ok".into(), Timestamp(2)).unwrap();
        assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("ok".into())));
        let err = bb.set_variable(MOOD, &"far too long".into(), Timestamp(3)).unwrap_err();
        assert!(matches!(err, BlackboardError::ValueTooLarge { capacity: 8, len: 12, .. }));
    }

    #[test]
    fn strings_with_interior_nul_rejected() {
        let mut bb = blackboard();
        let err = bb.set_variable(MOOD, &VarValue::Str("a\0b".into()), Timestamp(1)).unwrap_err();
        assert_eq!(err, BlackboardError::InvalidString(MOOD));
        assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("calm".into())));
    }

    #[test]
    fn raw_strings_must_read_back() {
        let mut bb = blackboard();
        let rejected: [&[u8]; 3] = [&[0xff, 0xfe], b"a\0b", b"\0x"];
        for bad in rejected {
            let err = bb.set_raw(MOOD, VarType::String, bad, Timestamp(1)).unwrap_err();
            assert_eq!(err, BlackboardError::InvalidString(MOOD));
        }
        assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("calm".into())));

        // Trailing NUL padding, as returned by `get_raw`, is accepted.
        bb.set_raw(MOOD, VarType::String, b"hi\0\0\0\0\0\0", Timestamp(2)).unwrap();
        assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("hi".into())));
    }

    #[test]
    fn raw_fixed_size_must_match_slot() {
        let mut bb = blackboard();
        let err = bb.set_raw(SPEED, VarType::Float, &[0u8; 3], Timestamp(1)).unwrap_err();
        assert!(matches!(err, BlackboardError::ValueTooLarge { .. }));
    }

    #[test]
    fn get_raw_unknown_leaves_buffer_untouched() {
        let bb = blackboard();
        let mut out = [0xAB_u8; 16];
        let ty = bb.get_raw(VarKey::from_name("undeclared"), &mut out);
        assert_eq!(ty, VarType::Invalid);
        assert_eq!(out, [0xAB_u8; 16]);
    }

    #[test]
    fn get_raw_short_buffer_leaves_it_untouched() {
        let bb = blackboard();
        let mut out = [0xCD_u8; 4];
        assert_eq!(bb.get_raw(HOME, &mut out), VarType::Invalid);
        assert_eq!(out, [0xCD_u8; 4]);
    }

    #[test]
    fn raw_round_trip_is_byte_identical() {
        let mut bb = blackboard();
        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&7.5_f32.to_le_bytes());
        bytes[4..8].copy_from_slice(&(-1.0_f32).to_le_bytes());
        bytes[8..12].copy_from_slice(&f32::MAX.to_le_bytes());
        bb.set_raw(HOME, VarType::Vec3, &bytes, Timestamp(9)).unwrap();

        let mut out = [0u8; 12];
        assert_eq!(bb.get_raw(HOME, &mut out), VarType::Vec3);
        assert_eq!(out, bytes);
        assert_eq!(bb.variable_bytes(HOME), Some(&bytes[..]));
    }

    #[test]
    fn read_only_rejects_writes() {
        let mut reg = VariableRegistry::new(2);
        reg.define(VariableDefinition::new("max_speed", 3.0_f32).with_flags(VarFlags::READ_ONLY))
            .unwrap();
        let key = VarKey::from_name("max_speed");
        let mut bb = AgentBlackboard::new(AgentId(0), Arc::new(reg.build_layout(TemplateId(0), 1)));
        assert_eq!(bb.set(key, 9.0_f32, Timestamp(1)), Err(BlackboardError::ReadOnly(key)));
        assert_eq!(bb.get::<f32>(key), Some(3.0));
    }

    #[test]
    fn reset_keeps_persistent_variables() {
        let mut reg = VariableRegistry::new(4);
        reg.define(VariableDefinition::new("wealth", 100_i32).with_flags(VarFlags::PERSISTENT))
            .unwrap();
        reg.define(VariableDefinition::new("hunger", 0_i32)).unwrap();
        let wealth = VarKey::from_name("wealth");
        let mut bb = AgentBlackboard::new(AgentId(0), Arc::new(reg.build_layout(TemplateId(0), 2)));

        bb.set(wealth, 250_i32, Timestamp(1)).unwrap();
        bb.set(HUNGER, 60_i32, Timestamp(1)).unwrap();
        bb.instance_mut(NodeIndex(1)).state = NodeState::Running;
        bb.instance_mut(NodeIndex(1)).execution_count = 3;

        bb.reset(Timestamp(2));
        assert_eq!(bb.get::<i32>(wealth), Some(250));
        assert_eq!(bb.get::<i32>(HUNGER), Some(0));
        assert_eq!(*bb.instance(NodeIndex(1)), NodeInstance::RESET);
        assert_eq!(bb.last_update(), Timestamp(2));
    }

    #[test]
    fn record_tick_bumps_header() {
        let mut bb = blackboard();
        bb.record_tick(Timestamp(40));
        bb.record_tick(Timestamp(80));
        assert_eq!(bb.header().ticks, 2);
        assert_eq!(bb.last_update(), Timestamp(80));
    }

    #[test]
    fn halt_keeps_history() {
        let mut inst = NodeInstance {
            state:           NodeState::Running,
            execution_count: 5,
            current_child:   NodeIndex(2),
            iterations:      3,
            cooldown_end:    Timestamp(900),
            ..NodeInstance::RESET
        };
        inst.halt();
        assert_eq!(inst.state, NodeState::Invalid);
        assert_eq!(inst.current_child, NodeIndex::NONE);
        assert_eq!(inst.iterations, 0);
        assert_eq!(inst.execution_count, 5);
        assert_eq!(inst.cooldown_end, Timestamp(900));
    }
}

// ── Round-trip law ────────────────────────────────────────────────────────────

#[cfg(test)]
mod round_trip {
    use proptest::prelude::*;

    use super::*;
    use crate::{VarType, VarValue};

    proptest! {
        #[test]
        fn float_bits_survive(bits in any::<u32>()) {
            let mut bb = blackboard();
            let bytes = bits.to_le_bytes();
            bb.set_raw(SPEED, VarType::Float, &bytes, Timestamp(1)).unwrap();
            let mut out = [0u8; 4];
            prop_assert_eq!(bb.get_raw(SPEED, &mut out), VarType::Float);
            prop_assert_eq!(out, bytes);
        }

        #[test]
        fn entity_values_survive(id in any::<u32>()) {
            let mut bb = blackboard();
            bb.set(EMPLOYER, EntityId(id), Timestamp(1)).unwrap();
            prop_assert_eq!(bb.get::<EntityId>(EMPLOYER), Some(EntityId(id)));
        }

        #[test]
        fn accepted_strings_read_back(chars in prop::collection::vec(any::<char>(), 0..6)) {
            let s: String = chars.into_iter().collect();
            let mut bb = blackboard();
            match bb.set_variable(MOOD, &VarValue::Str(s.clone()), Timestamp(1)) {
                Ok(()) => {
                    prop_assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str(s)));
                }
                Err(_) => {
                    prop_assert!(s.len() > 8 || s.contains('\0'));
                    prop_assert_eq!(bb.get_variable(MOOD), Some(VarValue::Str("calm".into())));
                }
            }
        }

        #[test]
        fn accepted_raw_strings_read_back(bytes in prop::collection::vec(any::<u8>(), 0..=8)) {
            let mut bb = blackboard();
            let accepted = bb.set_raw(MOOD, VarType::String, &bytes, Timestamp(1)).is_ok();
            // A declared variable always reads back as something.
            let value = bb.get_variable(MOOD);
            prop_assert!(value.is_some());
            if accepted {
                let mut out = [0u8; 8];
                prop_assert_eq!(bb.get_raw(MOOD, &mut out), VarType::String);
                prop_assert_eq!(&out[..bytes.len()], &bytes[..]);
                prop_assert!(out[bytes.len()..].iter().all(|&b| b == 0));
            } else {
                prop_assert_eq!(value, Some(VarValue::Str("calm".into())));
            }
        }

        #[test]
        fn vec2_values_survive(x in -1.0e6_f32..1.0e6, y in -1.0e6_f32..1.0e6) {
            let mut bb = blackboard();
            bb.set(HEADING, Vec2::new(x, y), Timestamp(1)).unwrap();
            prop_assert_eq!(bb.get::<Vec2>(HEADING), Some(Vec2::new(x, y)));
        }
    }
}

// ── Pool ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool {
    use std::thread;

    use super::*;
    use crate::{BlackboardError, BlackboardPool, NodeInstance};
    use bt_core::{NodeIndex, NodeState};

    #[test]
    fn exhaustion_is_an_error_not_a_block() {
        let pool = BlackboardPool::new(2);
        let layout = citizen_layout();
        let a = pool.allocate(AgentId(0), &layout).unwrap();
        let _b = pool.allocate(AgentId(1), &layout).unwrap();
        assert_eq!(
            pool.allocate(AgentId(2), &layout).unwrap_err(),
            BlackboardError::PoolExhausted { capacity: 2 }
        );
        assert_eq!(pool.stats().exhausted, 1);

        pool.release(a);
        assert_eq!(pool.live(), 1);
        let c = pool.allocate(AgentId(2), &layout).unwrap();
        assert_eq!(c.agent_id(), AgentId(2));
    }

    #[test]
    fn reused_storage_is_reinitialized() {
        let pool = BlackboardPool::new(1);
        let layout = citizen_layout();
        let mut first = pool.allocate(AgentId(0), &layout).unwrap();
        first.set(HUNGER, 77_i32, Timestamp(1)).unwrap();
        first.instance_mut(NodeIndex(2)).state = NodeState::Running;
        first.instance_mut(NodeIndex(2)).execution_count = 12;
        pool.release(first);

        let second = pool.allocate(AgentId(5), &layout).unwrap();
        assert_eq!(second.agent_id(), AgentId(5));
        assert_eq!(second.get::<i32>(HUNGER), Some(10));
        assert!(second.instances().iter().all(|i| *i == NodeInstance::RESET));
        assert_eq!(second.header().ticks, 0);
    }

    #[test]
    fn dropping_a_blackboard_frees_its_slot() {
        let pool = BlackboardPool::new(1);
        let layout = citizen_layout();
        {
            let _bb = pool.allocate(AgentId(0), &layout).unwrap();
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);
        assert!(pool.allocate(AgentId(1), &layout).is_ok());
    }

    #[test]
    fn foreign_blackboard_is_not_absorbed() {
        let pool = BlackboardPool::new(1);
        let other = BlackboardPool::new(1);
        let layout = citizen_layout();
        let bb = other.allocate(AgentId(0), &layout).unwrap();
        pool.release(bb);
        assert_eq!(pool.stats().releases, 0);
        assert_eq!(other.live(), 0, "slot still returned to its own pool");
    }

    #[test]
    fn stats_track_peak() {
        let pool = BlackboardPool::new(4);
        let layout = citizen_layout();
        let bbs: Vec<_> = (0..3).map(|i| pool.allocate(AgentId(i), &layout).unwrap()).collect();
        for bb in bbs {
            pool.release(bb);
        }
        let stats = pool.stats();
        assert_eq!(stats.peak, 3);
        assert_eq!(stats.live, 0);
        assert_eq!(stats.allocations, 3);
        assert_eq!(stats.releases, 3);
    }

    #[test]
    fn concurrent_spawn_despawn_never_exceeds_capacity() {
        const CAPACITY: usize = 8;
        let pool = BlackboardPool::new(CAPACITY);
        let layout = citizen_layout();

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let pool = pool.clone();
                let layout = Arc::clone(&layout);
                thread::spawn(move || {
                    let mut held = Vec::new();
                    for i in 0..500u32 {
                        match pool.allocate(AgentId(t * 1_000 + i), &layout) {
                            Ok(bb) => held.push(bb),
                            Err(BlackboardError::PoolExhausted { .. }) => {}
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                        assert!(pool.live() <= CAPACITY);
                        if held.len() > 1 || i % 3 == 0 {
                            if let Some(bb) = held.pop() {
                                pool.release(bb);
                            }
                        }
                    }
                    for bb in held {
                        pool.release(bb);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.live, 0);
        assert!(stats.peak <= CAPACITY);
        assert_eq!(stats.allocations, stats.releases);
    }
}
