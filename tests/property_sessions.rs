use proptest::prelude::*;

use rep_counter::landmark::{LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, POSE_LANDMARK_COUNT};
use rep_counter::{Exercise, ExerciseConfig, Landmark, Phase, RepCounter};
use rep_tracker_backend::config::SessionLimits;
use rep_tracker_backend::registry::{RegistryError, SessionRegistry};

fn left_knee_frame(degrees: Option<f64>) -> Vec<Option<Landmark>> {
    let mut frame = vec![None; POSE_LANDMARK_COUNT];
    if let Some(deg) = degrees {
        let rad = deg.to_radians();
        frame[LEFT_HIP] = Some(Landmark::new(0.5, 0.3));
        frame[LEFT_KNEE] = Some(Landmark::new(0.5, 0.5));
        frame[LEFT_ANKLE] = Some(Landmark::new(0.5 + 0.2 * rad.sin(), 0.5 - 0.2 * rad.cos()));
    }
    frame
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pt_registry_matches_bare_counter(
        angles in prop::collection::vec(prop::option::of(1.0_f64..179.0), 1..60),
    ) {
        let cfg = ExerciseConfig::new(Exercise::Squat);
        let mut counter = RepCounter::new();
        for angle in &angles {
            counter.step(&[*angle, None], &cfg);
        }

        let snapshot = tokio_test::block_on(async {
            let registry = SessionRegistry::new(SessionLimits::default());
            let session = registry.create(cfg).await.unwrap();
            for angle in &angles {
                registry
                    .process_frame(session.id, None, &left_knee_frame(*angle))
                    .await
                    .unwrap();
            }
            registry.get(session.id).await.unwrap()
        });

        prop_assert_eq!(snapshot.rep_count, counter.rep_count());
        prop_assert_eq!(snapshot.phase, counter.phase());
        prop_assert_eq!(snapshot.frames_processed, angles.len() as u64);
    }

    #[test]
    fn pt_out_of_order_sequences_never_apply(
        sequences in prop::collection::vec(0_u64..50, 1..40),
    ) {
        tokio_test::block_on(async {
            let registry = SessionRegistry::new(SessionLimits::default());
            let session = registry
                .create(ExerciseConfig::new(Exercise::Squat))
                .await
                .unwrap();

            let mut highest: Option<u64> = None;
            let mut accepted = 0_u64;
            for seq in sequences {
                let result = registry
                    .process_frame(session.id, Some(seq), &left_knee_frame(Some(170.0)))
                    .await;
                match highest {
                    Some(last) if seq <= last => {
                        assert_eq!(result.unwrap_err(), RegistryError::StaleFrame { sequence: seq, last });
                    }
                    _ => {
                        assert!(result.is_ok());
                        highest = Some(seq);
                        accepted += 1;
                    }
                }
            }

            let snapshot = registry.get(session.id).await.unwrap();
            assert_eq!(snapshot.frames_processed, accepted);
            assert_eq!(snapshot.last_sequence, highest);
            assert_eq!(snapshot.phase, Phase::Resting);
        });
    }
}
