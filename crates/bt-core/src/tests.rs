//! Unit tests for bt-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, BehaviorKey, NodeIndex, TemplateId, VarKey, fnv1a};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(TemplateId::INVALID.0, u16::MAX);
        assert_eq!(NodeIndex::NONE, NodeIndex::INVALID);
        assert!(!NodeIndex::NONE.is_valid());
        assert!(NodeIndex(0).is_valid());
    }

    #[test]
    fn template_id_rejects_oversized_index() {
        assert!(TemplateId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(NodeIndex(3).to_string(), "NodeIndex(3)");
    }

    #[test]
    fn fnv1a_known_vectors() {
        // Reference values for 32-bit FNV-1a.
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn name_keys_are_const_and_stable() {
        const SPEED: VarKey = VarKey::from_name("speed");
        assert_eq!(SPEED, VarKey::from("speed"));
        assert_ne!(SPEED, VarKey::from_name("Speed"));
        assert_eq!(BehaviorKey::from_name("speed").0, SPEED.0);
    }
}

#[cfg(test)]
mod status {
    use crate::{NodeState, Status};

    #[test]
    fn invert_flips_only_outcomes() {
        assert_eq!(Status::Success.invert(), Status::Failure);
        assert_eq!(Status::Failure.invert(), Status::Success);
        assert_eq!(Status::Running.invert(), Status::Running);
    }

    #[test]
    fn node_state_from_status() {
        assert_eq!(NodeState::from(Status::Running), NodeState::Running);
        assert_eq!(NodeState::from(Status::Success).outcome(), Some(Status::Success));
        assert_eq!(NodeState::Invalid.outcome(), None);
        assert_eq!(NodeState::Running.outcome(), None);
        assert_eq!(NodeState::default(), NodeState::Invalid);
    }

    #[test]
    fn from_bool() {
        assert_eq!(Status::from_bool(true), Status::Success);
        assert_eq!(Status::from_bool(false), Status::Failure);
        assert!(Status::Failure.is_done());
        assert!(!Status::Running.is_done());
    }
}

#[cfg(test)]
mod time {
    use crate::{Clock, ManualClock, SystemClock, Timestamp};

    #[test]
    fn timestamp_arithmetic() {
        let t = Timestamp(1_000);
        assert_eq!(t + 500, Timestamp(1_500));
        assert_eq!(Timestamp(1_500).since(t), 500);
        assert_eq!(t.since(Timestamp(2_000)), 0, "since saturates");
        assert_eq!(Timestamp(u64::MAX).after_ms(1), Timestamp(u64::MAX));
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Timestamp(10));
        assert_eq!(clock.now(), Timestamp(10));
        clock.advance_ms(90);
        assert_eq!(clock.now(), Timestamp(100));
        clock.set(Timestamp(5));
        assert_eq!(clock.now(), Timestamp(5));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

#[cfg(test)]
mod geo {
    use crate::{Vec2, Vec3};

    #[test]
    fn zero_is_default() {
        assert_eq!(Vec2::default(), Vec2::ZERO);
        assert_eq!(Vec3::default(), Vec3::ZERO);
    }

    #[test]
    fn display() {
        assert_eq!(Vec2::new(1.5, -2.0).to_string(), "(1.500, -2.000)");
        assert_eq!(Vec3::new(1.0, 2.0, 3.0).to_string(), "(1.000, 2.000, 3.000)");
    }
}

#[cfg(test)]
mod config {
    use crate::EngineConfig;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_budget() {
        let cfg = EngineConfig { node_visit_budget: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_template_count_colliding_with_sentinel() {
        let cfg = EngineConfig { max_templates: u16::MAX as usize, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_threads() {
        let cfg = EngineConfig { num_threads: Some(0), ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::TickRng;

    #[test]
    fn same_seed_same_order() {
        let mut a: Vec<u32> = (0..64).collect();
        let mut b = a.clone();
        TickRng::new(7).shuffle(&mut a);
        TickRng::new(7).shuffle(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut v: Vec<u32> = (0..100).collect();
        TickRng::new(1).shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a: Vec<u32> = (0..32).collect();
        let mut b = a.clone();
        TickRng::new(1).shuffle(&mut a);
        TickRng::new(2).shuffle(&mut b);
        assert_ne!(a, b);
    }
}

#[cfg(test)]
mod path {
    use crate::{AgentId, NoopPathRequester, PathRequester, PathStatus, Vec3};

    #[test]
    fn noop_requester_never_finds_a_path() {
        let status = NoopPathRequester.request_path(AgentId(0), Vec3::ZERO, Vec3::ZERO);
        assert_eq!(status, PathStatus::NoPath);
    }
}
