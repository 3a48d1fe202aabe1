use bathsim::protocol::Notification;
use bathsim::*;

fn controller() -> BathController {
    BathController::new(SimConfig::default(), ProfileStore::new())
}

fn small_tub(capacity_l: f64) -> BathController {
    let config = SimConfig {
        limits: BathLimits {
            tub_capacity_l: capacity_l,
            ..BathLimits::default()
        },
        ..SimConfig::default()
    };
    BathController::new(config, ProfileStore::new())
}

fn sample(ph: f64) -> WaterQuality {
    WaterQuality {
        ph,
        chlorides_mg_l: 300.0,
        iron_mg_l: 0.2,
        calcium_mg_l: 140.0,
        color: 20.0,
    }
}

#[test]
fn test_controller_initialization() {
    let ctl = controller();

    // Everything starts idle and plugged.
    assert!(!ctl.bath_state().on);
    assert!(!ctl.shower_state().on);
    assert_eq!(ctl.current_volume(), 0.0);
    assert!(ctl.bathtub_snapshot().stopper_closed);
    assert!(!ctl.salt_snapshot().pump_on);
    assert_eq!(ctl.salt_snapshot().remaining_fraction, 1.0);
    assert_eq!(ctl.default_temperature(), 20.0);
    assert!(ctl.water_quality().is_none());
    assert!(ctl.profile_names().is_empty());
}

#[test]
fn test_pipe_state_bounds_enforced_atomically() {
    let mut ctl = controller();

    // At the per-pipe ceilings.
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    ctl.set_pipe(PipeKind::Shower, true, Some(0.20), Some(40.0))
        .unwrap();

    // Above the bath ceiling.
    let err = ctl
        .set_pipe(PipeKind::Bath, true, Some(0.26), Some(38.0))
        .unwrap_err();
    assert_eq!(err.kind(), "DebitExceeded");
    // The pipe keeps its previous accepted state.
    assert_eq!(ctl.bath_state().debit_lps, 0.25);

    // The shower ceiling is tighter than the bath ceiling.
    let err = ctl
        .set_pipe(PipeKind::Shower, true, Some(0.25), Some(38.0))
        .unwrap_err();
    assert_eq!(err.kind(), "DebitExceeded");

    // An open pipe must flow.
    let err = ctl
        .set_pipe(PipeKind::Bath, true, Some(0.0), Some(38.0))
        .unwrap_err();
    assert_eq!(err.kind(), "DebitExceeded");

    // Temperature window.
    let err = ctl
        .set_pipe(PipeKind::Bath, true, Some(0.2), Some(4.0))
        .unwrap_err();
    assert_eq!(err.kind(), "TemperatureOutOfRange");
    let err = ctl
        .set_pipe(PipeKind::Bath, true, Some(0.2), Some(51.0))
        .unwrap_err();
    assert_eq!(err.kind(), "TemperatureOutOfRange");

    // An off pipe must carry zeros.
    let err = ctl
        .set_pipe_state(
            PipeKind::Bath,
            PipeState {
                on: false,
                temperature_c: 38.0,
                debit_lps: 0.0,
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidOffState");
}

#[test]
fn test_volume_stays_within_bounds() {
    let mut ctl = controller();
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    ctl.toggle_stopper(false);

    // Inflow above drain: volume rises by the difference each second.
    ctl.tick();
    assert!((ctl.current_volume() - 0.05).abs() < 1e-9);

    // Shut the pipe; drain alone can never push the volume negative.
    ctl.set_pipe(PipeKind::Bath, false, None, None).unwrap();
    ctl.tick();
    assert_eq!(ctl.current_volume(), 0.0);
    ctl.tick();
    assert_eq!(ctl.current_volume(), 0.0);
}

#[test]
fn test_capacity_shutoff_closes_both_pipes() {
    let mut ctl = small_tub(1.0);
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    ctl.set_pipe(PipeKind::Shower, true, Some(0.20), Some(40.0))
        .unwrap();
    ctl.take_notifications();

    ctl.tick(); // 0.45
    ctl.take_notifications();
    ctl.tick(); // 0.90
    ctl.take_notifications();
    ctl.tick(); // would be 1.35, clamps to capacity and trips

    assert_eq!(ctl.current_volume(), 1.0);
    assert!(!ctl.bath_state().on);
    assert!(!ctl.shower_state().on);

    // Shutoff notifications precede the volume report for that tick.
    let batch: Vec<Notification> = ctl.take_notifications().into_iter().collect();
    assert_eq!(
        batch,
        vec![
            Notification::PipeClosed {
                pipe: PipeKind::Bath
            },
            Notification::PipeClosed {
                pipe: PipeKind::Shower
            },
            Notification::CurrentVolume(1.0),
        ]
    );

    // A full, quiet tub is stable: later ticks change nothing.
    ctl.tick();
    assert_eq!(ctl.current_volume(), 1.0);
    assert!(!ctl.bath_state().on);
}

#[test]
fn test_prepare_bath_fills_to_target_and_stops() {
    let mut ctl = controller();

    let eta_s = ctl.prepare_bath(70.0, 38.0).unwrap();
    // 70 kg at 1.01 kg/L displaces ~69.31 L; at 0.25 L/s that is 278 s.
    assert_eq!(eta_s, 278);

    let bath = ctl.bath_state();
    assert!(bath.on);
    assert_eq!(bath.debit_lps, 0.25);
    assert_eq!(bath.temperature_c, 38.0);

    // A second preparation while one is in flight is rejected.
    assert_eq!(
        ctl.prepare_bath(50.0, 38.0).unwrap_err().kind(),
        "AlreadyPreparing"
    );

    let target_l = 70.0 / 1.01;
    let mut reached_at = None;
    for second in 1..=eta_s {
        ctl.tick();
        let batch = ctl.take_notifications();
        if batch.iter().any(|n| *n == Notification::TargetReached) {
            reached_at = Some(second);
            break;
        }
    }

    assert_eq!(reached_at, Some(eta_s));
    assert!(!ctl.bath_state().on);
    assert!(ctl.current_volume() >= target_l);
    assert!(ctl.bathtub_snapshot().fill_target_l.is_none());

    // The target fired exactly once; the tub just sits there afterwards.
    let volume = ctl.current_volume();
    ctl.tick();
    assert_eq!(ctl.current_volume(), volume);
    let batch = ctl.take_notifications();
    assert!(!batch.iter().any(|n| *n == Notification::TargetReached));
}

#[test]
fn test_prepare_bath_rejections() {
    let mut ctl = controller();

    // A body that would displace more than the tub holds.
    assert_eq!(
        ctl.prepare_bath(400.0, 38.0).unwrap_err().kind(),
        "TargetExceedsCapacity"
    );

    // Bad temperature is rejected before any state changes.
    assert_eq!(
        ctl.prepare_bath(70.0, 60.0).unwrap_err().kind(),
        "TemperatureOutOfRange"
    );
    assert!(!ctl.bath_state().on);
    assert!(ctl.bathtub_snapshot().fill_target_l.is_none());

    // Fill past a small target, then ask for it: already full.
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    for _ in 0..80 {
        ctl.tick();
        ctl.take_notifications();
    }
    ctl.set_pipe(PipeKind::Bath, false, None, None).unwrap();
    assert!(ctl.current_volume() >= 20.0 / 1.01);
    assert_eq!(
        ctl.prepare_bath(20.0, 38.0).unwrap_err().kind(),
        "AlreadyFull"
    );
}

#[test]
fn test_turning_pipe_off_cancels_preparation() {
    let mut ctl = controller();
    ctl.prepare_bath(70.0, 38.0).unwrap();
    assert!(ctl.bathtub_snapshot().fill_target_l.is_some());

    ctl.set_pipe(PipeKind::Bath, false, None, None).unwrap();
    assert!(ctl.bathtub_snapshot().fill_target_l.is_none());

    // With the target gone a new preparation is accepted.
    assert!(ctl.prepare_bath(70.0, 38.0).is_ok());
}

#[test]
fn test_quality_shutoff_on_next_tick() {
    let mut ctl = controller();
    ctl.set_pipe(PipeKind::Shower, true, Some(0.2), Some(40.0))
        .unwrap();

    // An in-range sample changes nothing.
    ctl.set_water_quality(sample(7.0));
    ctl.tick();
    assert!(ctl.shower_state().on);

    // An out-of-range sample does not shut pipes immediately...
    ctl.set_water_quality(sample(9.0));
    assert!(ctl.shower_state().on);

    // ...but the next tick does.
    ctl.tick();
    assert!(!ctl.shower_state().on);
    assert!(!ctl.bath_state().on);
}

#[test]
fn test_no_quality_sample_means_no_shutoff() {
    let mut ctl = controller();
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    for _ in 0..5 {
        ctl.tick();
        ctl.take_notifications();
    }
    assert!(ctl.bath_state().on);
}

#[test]
fn test_salt_pump_gating() {
    let mut ctl = small_tub(2.0);

    // Empty tub: below a quarter full, salt or not.
    assert_eq!(ctl.toggle_pump(true).unwrap_err().kind(), "VolumeTooLow");

    // Fill to exactly a quarter (2 ticks at 0.25 L/s into a 2 L tub).
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    ctl.tick();
    ctl.tick();
    assert!((ctl.current_volume() - 0.5).abs() < 1e-9);
    ctl.toggle_pump(true).unwrap();
    assert!(ctl.salt_snapshot().pump_on);

    // An empty reservoir rejects enabling.
    ctl.toggle_pump(false).unwrap();
    ctl.set_salt_remaining(0.0);
    assert_eq!(ctl.toggle_pump(true).unwrap_err().kind(), "NoSalt");

    // Restock, re-enable, then drain below the gate: the tick trips it.
    ctl.set_salt_remaining(0.8);
    ctl.toggle_pump(true).unwrap();
    ctl.set_pipe(PipeKind::Bath, false, None, None).unwrap();
    ctl.toggle_stopper(false);
    ctl.tick(); // 0.3 L, ratio 0.15
    assert!(!ctl.salt_snapshot().pump_on);
}

#[test]
fn test_profile_lifecycle_through_controller() {
    let mut ctl = controller();
    let ana = UserProfile {
        weight_kg: 70.0,
        bath_temperature_c: 38.0,
        shower_temperature_c: 40.0,
    };

    // Nothing selected yet.
    assert_eq!(
        ctl.prepare_bath_for_active_profile().unwrap_err().kind(),
        "NoActiveProfile"
    );

    ctl.add_profile("ana", ana).unwrap();
    assert_eq!(
        ctl.add_profile("ana", ana).unwrap_err().kind(),
        "ProfileExists"
    );

    // Profile fields are validated like any other input.
    let heavy = UserProfile {
        weight_kg: 130.0,
        ..ana
    };
    assert_eq!(
        ctl.add_profile("bob", heavy).unwrap_err().kind(),
        "WeightOutOfRange"
    );

    ctl.set_active_profile("ana").unwrap();
    let eta_s = ctl.prepare_bath_for_active_profile().unwrap();
    assert_eq!(eta_s, 278);
    assert_eq!(ctl.bath_state().temperature_c, 38.0);

    // Removing the active profile clears the selection.
    ctl.set_pipe(PipeKind::Bath, false, None, None).unwrap();
    ctl.remove_profile("ana").unwrap();
    assert_eq!(
        ctl.prepare_bath_for_active_profile().unwrap_err().kind(),
        "NoActiveProfile"
    );
    assert_eq!(
        ctl.remove_profile("ana").unwrap_err().kind(),
        "ProfileNotFound"
    );
}

#[test]
fn test_notification_lines_match_wire_format() {
    let mut ctl = controller();
    ctl.set_pipe(PipeKind::Bath, true, Some(0.25), Some(38.0))
        .unwrap();
    ctl.tick();

    let lines: Vec<String> = ctl
        .take_notifications()
        .iter()
        .map(|n| n.render().to_string())
        .collect();
    assert_eq!(lines, vec!["pipe/bath/on/0.25/38", "currentVolume/0.25"]);
}
