//! Tests that drive whole episodes through the environment interface.

use assert_approx_eq::assert_approx_eq;
use race_sim::{
    math::Point2d, Action, Autopilot, BoxSpace, EnvAttributes, EpisodeEnd, Environment, RaceEnv,
    SimError, TrackAttributes, VehicleAttributes,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::FRAC_PI_4;

fn default_env() -> RaceEnv {
    RaceEnv::new(EnvAttributes::default()).unwrap()
}

/// An octagonal track gentle enough for the autopilot to lap.
fn octagon() -> EnvAttributes {
    let waypoints = [
        (223.0, 285.0),
        (385.0, 123.0),
        (615.0, 123.0),
        (777.0, 285.0),
        (777.0, 515.0),
        (615.0, 677.0),
        (385.0, 677.0),
        (223.0, 515.0),
    ];
    EnvAttributes {
        track: TrackAttributes {
            waypoints: waypoints.iter().map(|&(x, y)| Point2d::new(x, y)).collect(),
            ..Default::default()
        },
        vehicle: VehicleAttributes {
            start_position: Point2d::new(223.0, 285.0),
            start_heading: -FRAC_PI_4,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn reset_observation() {
    let mut env = default_env();
    let obs = env.reset(Some(42));
    assert_eq!(obs.len(), 9);
    assert!(env.observation_space().contains(obs.as_slice()));
    // The heading channel is zero at the start pose, so the legacy
    // all-`[0, 1]` bounds hold too.
    assert!(BoxSpace::legacy_observation(7).contains(obs.as_slice()));

    let expected = [0.425, 0.625, 1.0, 1.0, 0.425, 0.375, 1.0];
    for (ray, expected) in obs.rays().iter().zip(expected) {
        assert_approx_eq!(*ray as f64, expected, 1e-6);
    }
    assert_eq!(obs.speed(), 0.0);
    assert_eq!(obs.heading_sin(), 0.0);
    assert_eq!(env.position(), Point2d::new(100.0, 150.0));
    assert_eq!(env.steps(), 0);
    assert_eq!(env.current_checkpoint(), 0);
    assert_eq!(env.laps(), 0);
}

#[test]
fn straight_line_reaches_first_checkpoint() {
    let mut env = default_env();
    env.reset(None);
    let throttle = Action::new(0.0, 1.0);

    for step in 1..63 {
        let result = env.step(throttle).unwrap();
        assert!(!result.done(), "ended early at step {}", step);
        assert_eq!(result.info.checkpoint, None);
        assert_approx_eq!(result.reward, -0.05);
    }

    let result = env.step(throttle).unwrap();
    assert_eq!(result.info.checkpoint, Some(1));
    assert_eq!(result.info.reward.checkpoint, 20.0);
    assert_approx_eq!(result.reward, 19.95);
    assert!(!result.done());
    assert_eq!(env.current_checkpoint(), 1);
    assert_eq!(env.steps(), 63);
    assert_approx_eq!(env.position().y, 150.0);
    assert_approx_eq!(env.position().x, 525.13, 0.05);

    // Overshooting the turn eventually drives away from the next checkpoint.
    let end = loop {
        let result = env.step(throttle).unwrap();
        if result.done() {
            break result;
        }
    };
    assert_eq!(end.info.end, Some(EpisodeEnd::Regression));
    assert_eq!(env.steps(), 102);
}

#[test]
fn regression_resets_the_vehicle() {
    let mut env = default_env();
    let start = env.reset(None);

    for _ in 0..21 {
        let result = env.step(Action::new(1.0, 0.0)).unwrap();
        assert!(!result.done());
    }
    assert!(env.heading() > 3.0);

    let result = env.step(Action::new(0.0, 1.0)).unwrap();
    assert!(!result.done());
    let result = env.step(Action::new(0.0, 1.0)).unwrap();
    assert_eq!(result.info.end, Some(EpisodeEnd::Regression));
    assert_eq!(result.reward, -100.0);
    assert!(result.terminated);
    assert!(!result.truncated);

    assert_eq!(env.position(), Point2d::new(100.0, 150.0));
    assert_eq!(env.heading(), 0.0);
    assert_eq!(env.speed(), 0.0);
    assert_eq!(env.current_checkpoint(), 0);
    assert_eq!(env.steps(), 23);
    assert_eq!(result.observation, start);
}

#[test]
fn reversing_ends_the_episode() {
    let mut env = default_env();
    env.reset(None);
    let result = env.step(Action::new(0.0, -1.0)).unwrap();
    assert!(!result.done());
    let result = env.step(Action::new(0.0, -1.0)).unwrap();
    assert_eq!(result.info.end, Some(EpisodeEnd::Backward));
    assert_eq!(result.reward, -100.0);
    assert!(result.terminated);
}

#[test]
fn idling_times_out() {
    let mut env = default_env();
    env.reset(None);
    for _ in 0..1500 {
        let result = env.step(Action::default()).unwrap();
        assert!(!result.done());
    }
    let result = env.step(Action::default()).unwrap();
    assert!(result.truncated);
    assert!(!result.terminated);
    assert_eq!(result.info.end, Some(EpisodeEnd::Timeout));
    assert_approx_eq!(result.reward, -0.05);
    assert_eq!(env.steps(), 1501);

    assert_eq!(env.step(Action::default()).unwrap_err(), SimError::EpisodeOver);
    env.reset(None);
    assert_eq!(env.steps(), 0);
    assert!(env.step(Action::default()).is_ok());
}

#[test]
fn driving_into_a_wall() {
    let mut env = default_env();
    env.reset(None);
    for _ in 0..11 {
        env.step(Action::new(-1.0, 0.0)).unwrap();
    }
    assert_approx_eq!(env.heading(), -1.65);

    for step in 1..21 {
        let result = env.step(Action::new(0.0, 1.0)).unwrap();
        assert!(!result.done(), "ended early at step {}", step);
    }
    let result = env.step(Action::new(0.0, 1.0)).unwrap();
    assert_eq!(result.info.end, Some(EpisodeEnd::Collision));
    assert_eq!(result.info.reward.collision, -50.0);
    assert_approx_eq!(result.reward, -50.05);
    assert!(result.terminated);

    // Collisions leave the vehicle where it crashed.
    assert_approx_eq!(env.position().x, 93.6, 0.1);
    assert_approx_eq!(env.position().y, 69.8, 0.1);
    assert!(env.track().is_wall(env.position()));
}

#[test]
fn invalid_actions_are_rejected() {
    let mut env = default_env();
    env.reset(None);
    assert!(matches!(
        env.step(Action::new(0.0, f64::INFINITY)),
        Err(SimError::InvalidAction(_))
    ));
    assert!(matches!(
        Action::try_from(&[0.0f32][..]),
        Err(SimError::InvalidAction(_))
    ));
    assert_eq!(env.steps(), 0);

    // Out of range but finite values pass through unclamped.
    let result = env.step(Action::new(2.0, 0.0)).unwrap();
    assert!(!result.done());
    assert_approx_eq!(env.heading(), 0.3);
}

#[test]
fn identical_actions_give_identical_episodes() {
    let mut rng = StdRng::from_seed(*b"race-sim determinism test seed!!");
    let mut a = default_env();
    let mut b = default_env();
    assert_eq!(a.reset(Some(1)), b.reset(Some(2)));

    for _ in 0..2000 {
        let action = Action::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-0.2..=1.0));
        let ra = a.step(action).unwrap();
        let rb = b.step(action).unwrap();
        assert_eq!(ra.observation, rb.observation);
        assert_eq!(ra.reward, rb.reward);
        assert_eq!(ra.info, rb.info);
        assert_eq!(a.position(), b.position());
        if ra.done() {
            a.reset(None);
            b.reset(None);
        }
    }
}

#[test]
fn autopilot_completes_a_lap() {
    let mut env = RaceEnv::new(octagon()).unwrap();
    env.reset(None);
    let pilot = Autopilot::default();

    let mut reached = vec![];
    let last = loop {
        let action = pilot.act(env.track(), env.episode().vehicle());
        let result = env.step(action).unwrap();
        if let Some(idx) = result.info.checkpoint {
            reached.push(idx);
        }
        if result.done() {
            break result;
        }
    };

    assert_eq!(reached, vec![1, 2, 3, 4, 5, 6, 7, 0]);
    assert_eq!(last.info.end, Some(EpisodeEnd::LapComplete));
    assert!(last.terminated);
    assert_eq!(last.info.reward.lap, 1000.0);
    assert_approx_eq!(last.reward, 1019.95);
    assert_eq!(env.laps(), 1);
    assert_eq!(env.current_checkpoint(), 0);
    assert_eq!(env.steps(), 403);
}

#[test]
fn environments_share_a_track() {
    let first = default_env();
    let track = first.track().clone();
    let mut second = RaceEnv::with_track(track.clone(), EnvAttributes::default()).unwrap();
    assert!(std::sync::Arc::ptr_eq(first.track(), second.track()));
    assert_eq!(std::sync::Arc::strong_count(&track), 3);

    second.reset(None);
    second.step(Action::new(0.0, 1.0)).unwrap();
    assert_eq!(first.steps(), 0);
    assert_eq!(second.steps(), 1);
}

#[test]
fn invalid_attributes_are_rejected() {
    let mut attribs = EnvAttributes::default();
    attribs.track.waypoints.truncate(2);
    assert!(matches!(
        RaceEnv::new(attribs),
        Err(SimError::Configuration(_))
    ));

    let mut attribs = EnvAttributes::default();
    attribs.reward.max_steps = 0;
    assert!(matches!(
        RaceEnv::new(attribs),
        Err(SimError::Configuration(_))
    ));

    let mut attribs = EnvAttributes::default();
    attribs.sensor.ray_count = 0;
    assert!(attribs.validate().is_err());
}
