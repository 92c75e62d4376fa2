//! Property-based tests for stabilization detection
//!
//! These tests pin down the detector's contract over arbitrary parameter
//! choices: growth never stops a session, flat feeds stop on exactly the
//! tick where patience runs out, and the schedules are monotone.

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use settle_detector::*;
    use std::time::{Duration, Instant};

    fn arb_params() -> impl Strategy<Value = DetectorParameters> {
        (0u64..10, 1usize..12, 2usize..40, 0u64..3_000, 0u64..1_000, 0u64..20_000).prop_map(
            |(threshold, base, step, base_delay, step_delay, extra)| {
                DetectorParameters::default()
                    .with_min_growth_threshold(threshold)
                    .with_patience(base, step)
                    .with_delays(base_delay, step_delay, base_delay + extra)
            },
        )
    }

    /// Stagnant calls a flat feed survives after `offset` growing ticks
    fn stagnant_calls_until_stop(params: DetectorParameters, offset: usize) -> usize {
        let params = params.with_baseline(BaselineMode::Zero);
        let mut detector = StabilizationDetector::new(params);
        let start = Instant::now();
        let step = params.min_growth_threshold + 1;

        let mut size = 0u64;
        for _ in 0..offset {
            size += step;
            assert!(detector.observe(size, start).is_continue());
        }

        let mut calls = 0;
        loop {
            calls += 1;
            if detector.observe(size, start).is_stop() {
                return calls;
            }
            assert!(calls < 100_000, "detector never stopped");
        }
    }

    proptest! {
        // Property: a feed that keeps growing never stops and never stalls
        #[test]
        fn prop_growing_feed_never_stops(
            params in arb_params(),
            increments in prop::collection::vec(1u64..500, 1..200)
        ) {
            let params = params.with_baseline(BaselineMode::Zero);
            let mut detector = StabilizationDetector::new(params);
            let start = Instant::now();
            let mut size = 0u64;

            for (i, inc) in increments.iter().enumerate() {
                size += params.min_growth_threshold + inc;
                let decision = detector.observe(size, start + Duration::from_millis(i as u64));
                prop_assert_eq!(decision, Decision::Continue { delay_ms: params.base_delay_ms });
                prop_assert_eq!(detector.stagnant_count(), 0);
            }
            prop_assert!(detector.is_active());
        }

        // Property: a flat feed stops on exactly the tick where patience runs out
        #[test]
        fn prop_flat_feed_stops_exactly_at_limit(
            params in arb_params(),
            size in 0u64..1_000_000
        ) {
            let schedule = PatienceSchedule::from(&params);
            let expected = (1..)
                .find(|&call: &usize| call >= schedule.limit_at(call - 1))
                .unwrap();

            let mut detector = StabilizationDetector::new(params);
            let start = Instant::now();
            for call in 1..expected {
                prop_assert!(detector.observe(size, start).is_continue(), "stopped early at call {}", call);
                prop_assert_eq!(detector.stagnant_count(), call);
            }
            prop_assert_eq!(detector.observe(size, start), Decision::Stop);
            prop_assert_eq!(detector.stagnant_count(), expected);
            prop_assert!(!detector.is_active());
        }

        // Property: a longer session never gives up earlier on the same stall
        #[test]
        fn prop_patience_monotone_in_session_length(
            params in arb_params(),
            offset_a in 0usize..150,
            extra in 0usize..150
        ) {
            let offset_b = offset_a + extra;
            let calls_a = stagnant_calls_until_stop(params, offset_a);
            let calls_b = stagnant_calls_until_stop(params, offset_b);
            prop_assert!(calls_b >= calls_a, "offset {} stopped after {} calls, offset {} after {}",
                offset_a, calls_a, offset_b, calls_b);

            let schedule = PatienceSchedule::from(&params);
            prop_assert!(schedule.limit_at(offset_b) >= schedule.limit_at(offset_a));
        }

        // Property: reset always yields a fresh active session
        #[test]
        fn prop_reset_restores_active(
            params in arb_params(),
            sizes in prop::collection::vec(0u64..100, 0..100)
        ) {
            let mut detector = StabilizationDetector::new(params);
            let start = Instant::now();
            for size in sizes {
                detector.observe(size, start);
            }
            detector.reset();
            prop_assert!(detector.is_active());
            prop_assert_eq!(detector.stagnant_count(), 0);
            prop_assert_eq!(detector.total_ticks(), 0);
        }

        // Property: advisory delay is non-decreasing in the stall and capped
        #[test]
        fn prop_backoff_monotone_and_capped(params in arb_params(), upto in 1usize..500) {
            let backoff = BackoffSchedule::from(&params);
            let mut previous = backoff.delay_for(0);
            for stagnant in 1..=upto {
                let delay = backoff.delay_for(stagnant);
                prop_assert!(delay >= previous);
                prop_assert!(delay <= params.max_delay_ms);
                previous = delay;
            }
        }

        // Property: delays handed out by the detector follow the stall length
        #[test]
        fn prop_detector_delays_track_stall(params in arb_params(), size in 0u64..10_000) {
            let params = params.with_patience(64, 0);
            let mut detector = StabilizationDetector::new(params);
            let start = Instant::now();
            let mut previous = 0u64;
            for _ in 0..63 {
                match detector.observe(size, start) {
                    Decision::Continue { delay_ms } => {
                        prop_assert!(delay_ms >= previous);
                        prop_assert!(delay_ms <= params.max_delay_ms);
                        previous = delay_ms;
                    }
                    Decision::Stop => prop_assert!(false, "stopped before patience ran out"),
                }
            }
        }

        // Property: negative and non-finite sizes behave like zero
        #[test]
        fn prop_malformed_sizes_clamp(raw in prop::collection::vec(
            prop_oneof![
                Just(f64::NAN),
                Just(f64::INFINITY),
                Just(f64::NEG_INFINITY),
                -1e12f64..0.0,
            ],
            1..40,
        )) {
            let params = DetectorParameters::fixed(1_000);
            let mut clamped = StabilizationDetector::new(params);
            let mut zeros = StabilizationDetector::new(params);
            let start = Instant::now();
            for value in raw {
                prop_assert_eq!(clamped.observe_value(value, start), zeros.observe(0, start));
            }
            prop_assert_eq!(clamped.state(), zeros.state());
        }
    }
}
