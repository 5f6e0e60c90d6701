//! The navigation control loop.
//!
//! One cycle, at `control.rate_hz`:
//!
//! ```text
//! read_inertial ─▶ PDR.ingest ─▶ PDR.drain ─▶ EKF.predict
//!                                               │
//! scan result? ─▶ Localizer.estimate ─▶ EKF.update
//!                                               │
//! key presses ─▶ keypad / start navigation / where am I
//!                                               │
//!                       Announcer.update ─▶ play cues ─▶ publish snapshot
//! ```
//!
//! Radio scans are requested every `scan.interval_s` and on "where am I";
//! they complete on the scan worker and are applied on a later cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tire_core::{
    AStarPlanner, Announcer, AudioCue, Ekf, FingerprintLocalizer, NavigationGraph, PdrProcessor,
    RadioMap,
};
use tire_hal::{DeviceDriver, InputEvent};

use crate::config::NavConfig;
use crate::error::Result;
use crate::keypad::Keypad;
use crate::shared::{PoseSnapshot, SharedPose};
use crate::threads::{ScanResult, ScanWorker};

/// Owns the device and every estimator; runs on the `control` thread.
pub struct ControlLoop {
    config: NavConfig,
    device: Box<dyn DeviceDriver>,
    pdr: PdrProcessor,
    ekf: Ekf,
    localizer: FingerprintLocalizer,
    graph: Arc<NavigationGraph>,
    announcer: Announcer,
    scans: ScanWorker,
    keypad: Keypad,
    shared: Arc<SharedPose>,
    last_sample: Option<Instant>,
    last_scan_request: Option<Instant>,
    /// "Where am I" pressed, waiting for the next applied fix
    location_requested: bool,
}

impl ControlLoop {
    /// Bring up the device, split off its scanner and start the scan worker.
    pub fn new(
        config: NavConfig,
        mut device: Box<dyn DeviceDriver>,
        graph: Arc<NavigationGraph>,
        radio_map: RadioMap,
        shared: Arc<SharedPose>,
    ) -> Result<Self> {
        device.initialize()?;
        let scanner = device.radio_scanner()?;
        let scans = ScanWorker::spawn(scanner, config.scan.window(), config.scan.max_age())?;

        let mut localizer = FingerprintLocalizer::new(config.localizer);
        localizer.load(radio_map);

        let start = config.control.initial_pose();
        let mut ekf = Ekf::new(config.ekf);
        ekf.initialize(start.x, start.y, start.theta);
        shared.publish(PoseSnapshot::new(ekf.state()));

        log::info!(
            "[Control] Device '{}', {} nodes, start ({:.2}, {:.2}, {:.2})",
            device.name(),
            graph.len(),
            start.x,
            start.y,
            start.theta
        );

        Ok(Self {
            pdr: PdrProcessor::new(config.pdr),
            announcer: Announcer::new(config.guidance.clone()),
            config,
            device,
            ekf,
            localizer,
            graph,
            scans,
            keypad: Keypad::new(),
            shared,
            last_sample: None,
            last_scan_request: None,
            location_requested: false,
        })
    }

    /// Run until the device powers off or `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        let period = self.config.control.period();
        log::info!("[Control] Loop started ({:.0} Hz)", self.config.control.rate_hz);

        while running.load(Ordering::Relaxed) && self.device.is_powered_on() {
            let started = Instant::now();
            self.tick(started);
            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        self.scans.shutdown();
        self.shared.mark_finished();
        log::info!(
            "[Control] Loop stopped: {} steps, {} fixes applied, {} skipped",
            self.pdr.total_steps(),
            self.ekf.updates_applied(),
            self.ekf.updates_skipped()
        );
        Ok(())
    }

    /// One control cycle. Returns the cues played.
    pub fn tick(&mut self, now: Instant) -> Vec<AudioCue> {
        let mut cues = Vec::new();

        self.ingest_inertial(now);
        let step = self.pdr.drain();
        if step.step_detected || step.delta_heading != 0.0 {
            self.ekf.predict(&step);
        }

        self.schedule_scan(now);
        if let Some(result) = self.scans.poll() {
            self.apply_fix(&result, &mut cues);
        }

        while let Some(event) = self.device.read_input() {
            self.handle_input(event, &mut cues);
        }

        if let Some(cue) = self.announcer.update(&self.ekf.state(), &self.graph, now) {
            cues.push(cue);
        }

        for cue in &cues {
            if let Err(e) = self.device.play_cue(cue) {
                log::warn!("[Control] Failed to play '{}': {}", cue, e);
            }
        }

        self.publish();
        cues
    }

    fn ingest_inertial(&mut self, now: Instant) {
        let sample = match self.device.read_inertial() {
            Ok(sample) => sample,
            Err(tire_hal::Error::EndOfRecording) => return,
            Err(e) => {
                log::warn!("[Control] Inertial read failed: {}", e);
                return;
            }
        };

        let dt = self.device.sample_interval().unwrap_or_else(|| {
            self.last_sample
                .map(|last| now.saturating_duration_since(last).as_secs_f32())
                .unwrap_or(0.0)
        });
        self.last_sample = Some(now);

        if self.pdr.ingest(&sample, dt) {
            log::trace!("[Control] Sample ingested (dt={:.4})", dt);
        }
    }

    fn schedule_scan(&mut self, now: Instant) {
        let interval = self.config.scan.interval();
        let due = self
            .last_scan_request
            .is_none_or(|last| now.saturating_duration_since(last) >= interval);
        if due {
            self.scans.request();
            self.last_scan_request = Some(now);
        }
    }

    fn apply_fix(&mut self, result: &ScanResult, cues: &mut Vec<AudioCue>) {
        if result.scan.is_empty() {
            log::debug!("[Control] Scan #{} heard no beacons", result.request.seq);
            return;
        }
        let Some(fix) = self.localizer.estimate(&result.scan) else {
            return;
        };
        if !self.ekf.update(fix) {
            return;
        }

        let pose = self.ekf.state();
        log::debug!(
            "[Control] Fix ({:.2}, {:.2}) from scan #{} ({:?} old) -> pose ({:.2}, {:.2})",
            fix.x,
            fix.y,
            result.request.seq,
            result.duration,
            pose.x,
            pose.y
        );
        if self.location_requested {
            self.location_requested = false;
            cues.push(AudioCue::LocationUpdate);
        }
    }

    fn handle_input(&mut self, event: InputEvent, cues: &mut Vec<AudioCue>) {
        log::debug!("[Control] Input {:?}", event);
        match event {
            InputEvent::KeycodeUp(column) => {
                if !self.keypad.up(column as usize) {
                    log::warn!("[Control] No keycode column {}", column);
                }
            }
            InputEvent::KeycodeDown(column) => {
                if !self.keypad.down(column as usize) {
                    log::warn!("[Control] No keycode column {}", column);
                }
            }
            InputEvent::CurrentSelection => cues.push(self.current_selection()),
            InputEvent::StartNavigation => cues.push(self.start_navigation()),
            InputEvent::WhereAmI => {
                let pose = self.ekf.state();
                log::info!(
                    "[Control] Where am I: ({:.2}, {:.2}), requesting a fix",
                    pose.x,
                    pose.y
                );
                self.location_requested = true;
                if self.scans.is_in_flight() {
                    log::debug!("[Control] Scan already running, its fix will answer");
                } else {
                    self.scans.request();
                }
            }
        }
    }

    fn current_selection(&self) -> AudioCue {
        let code = self.keypad.code();
        let label = match self.config.navigation.resolve(&code) {
            Some(id) => self
                .graph
                .get_node(id)
                .map(|node| node.display_name.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| id.to_string()),
            None => code,
        };
        AudioCue::Selection(label)
    }

    /// Plan from the node nearest the fused pose to the selected destination.
    fn start_navigation(&mut self) -> AudioCue {
        let code = self.keypad.code();
        let Some(goal) = self.config.navigation.resolve(&code).map(str::to_owned) else {
            log::warn!("[Control] No destination for code {}", code);
            return AudioCue::NoPath;
        };

        let position = self.ekf.state().position();
        let Some(start) = self.graph.nearest_node(&position).map(|node| node.id.clone()) else {
            log::warn!("[Control] Navigation graph is empty");
            return AudioCue::NoPath;
        };

        let result = AStarPlanner::with_defaults(&self.graph).plan(&start, &goal);
        if !result.success {
            log::warn!(
                "[Control] No route {} -> {}: {:?}",
                start,
                goal,
                result.failure_reason
            );
            return AudioCue::NoPath;
        }

        log::info!(
            "[Control] Navigating {} -> {} ({:.1} m, {} nodes)",
            start,
            goal,
            result.cost,
            result.route.len()
        );
        self.announcer.accept_route(result.route);
        AudioCue::NavigationStarted
    }

    fn publish(&self) {
        self.shared.publish(PoseSnapshot {
            pose: self.ekf.state(),
            covariance: self.ekf.covariance(),
            total_steps: self.pdr.total_steps(),
            fixes_applied: self.ekf.updates_applied(),
            guidance: self.announcer.state(),
            next_target: self.announcer.next_target().map(str::to_owned),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tire_core::io::demo_hallway;
    use tire_core::io::map_loader::{HALLWAY_END, HALLWAY_MIDDLE, HALLWAY_START};
    use tire_core::{GRAVITY, GuidanceState, RadioScan};
    use tire_hal::devices::replay::{Recording, ReplayDevice, ReplayRecord};

    const DT: f32 = 0.02;

    fn standing(recording: &mut Recording, from: f32, samples: usize) -> f32 {
        for i in 0..samples {
            recording.push(ReplayRecord::Imu {
                t: from + i as f32 * DT,
                accel: [0.0, 0.0, GRAVITY],
                gyro: [0.0; 3],
            });
        }
        from + samples as f32 * DT
    }

    fn strides(recording: &mut Recording, from: f32, count: usize) -> f32 {
        let mut t = from;
        for _ in 0..count {
            for i in 0..30 {
                let accel_z = if i < 5 { 14.0 } else { GRAVITY };
                recording.push(ReplayRecord::Imu {
                    t,
                    accel: [0.0, 0.0, accel_z],
                    gyro: [0.0; 3],
                });
                t += DT;
            }
        }
        t
    }

    fn input(recording: &mut Recording, t: f32, event: InputEvent) {
        recording.push(ReplayRecord::Input { t, event });
    }

    fn quiet_config() -> NavConfig {
        let mut config = NavConfig::default();
        // Only the startup scan and explicit requests
        config.scan.interval_s = 1000.0;
        config
    }

    fn control(config: NavConfig, recording: Recording) -> (ControlLoop, Arc<SharedPose>) {
        let (graph, radio_map) = demo_hallway().unwrap();
        let shared = Arc::new(SharedPose::new(config.control.initial_pose()));
        let device = Box::new(ReplayDevice::new(recording, false));
        let control =
            ControlLoop::new(config, device, Arc::new(graph), radio_map, Arc::clone(&shared))
                .unwrap();
        (control, shared)
    }

    #[test]
    fn test_start_navigation_to_default_destination() {
        let mut recording = Recording::default();
        standing(&mut recording, 0.0, 10);
        input(&mut recording, 0.0, InputEvent::StartNavigation);
        let (mut control, shared) = control(quiet_config(), recording);

        let cues = control.tick(Instant::now());
        assert_eq!(cues, vec![AudioCue::NavigationStarted]);

        let session = control.announcer.session().unwrap();
        assert_eq!(session.route.start(), Some(HALLWAY_START));
        assert_eq!(session.route.goal(), Some(HALLWAY_END));

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.guidance, GuidanceState::Navigating);
        assert_eq!(snapshot.next_target.as_deref(), Some(HALLWAY_MIDDLE));
    }

    #[test]
    fn test_unknown_destination_plays_no_path() {
        let mut recording = Recording::default();
        standing(&mut recording, 0.0, 10);
        input(&mut recording, 0.0, InputEvent::StartNavigation);
        let mut config = quiet_config();
        config.navigation.default_destination = Some("ROOFTOP".to_string());
        let (mut control, _) = control(config, recording);

        assert_eq!(control.tick(Instant::now()), vec![AudioCue::NoPath]);
        assert_eq!(control.announcer.state(), GuidanceState::NoRoute);
    }

    #[test]
    fn test_keypad_selects_destination() {
        let mut recording = Recording::default();
        standing(&mut recording, 0.0, 10);
        input(&mut recording, 0.0, InputEvent::KeycodeUp(3));
        input(&mut recording, 0.0, InputEvent::CurrentSelection);
        input(&mut recording, 0.0, InputEvent::StartNavigation);
        let mut config = quiet_config();
        config
            .navigation
            .destinations
            .insert("0001".to_string(), HALLWAY_MIDDLE.to_string());
        let (mut control, _) = control(config, recording);

        let cues = control.tick(Instant::now());
        assert_eq!(
            cues,
            vec![
                AudioCue::Selection("Middle of Hallway".to_string()),
                AudioCue::NavigationStarted
            ]
        );
        assert_eq!(control.keypad.code(), "0001");
        let session = control.announcer.session().unwrap();
        assert_eq!(session.route.goal(), Some(HALLWAY_MIDDLE));
    }

    #[test]
    fn test_steps_move_fused_pose() {
        let mut recording = Recording::default();
        let t = standing(&mut recording, 0.0, 5);
        strides(&mut recording, t, 4);
        let (mut control, shared) = control(quiet_config(), recording);

        let now = Instant::now();
        for _ in 0..125 {
            control.tick(now);
        }
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.total_steps, 4);
        assert!(snapshot.pose.y > 1.5, "y = {}", snapshot.pose.y);
        assert!(snapshot.pose.x.abs() < 1e-3);
        assert!(snapshot.position_sigma() > 1.0);
    }

    #[test]
    fn test_where_am_i_applies_fix() {
        let mut recording = Recording::default();
        let mut end_scan = RadioScan::new();
        end_scan.insert("BEACON_ID_1", -90.0);
        end_scan.insert("BEACON_ID_2", -50.0);
        end_scan.insert("BEACON_ID_3", -80.0);
        recording.push(ReplayRecord::Scan {
            t: 0.0,
            signals: end_scan,
        });
        standing(&mut recording, 0.0, 500);
        input(&mut recording, 0.1, InputEvent::WhereAmI);
        let mut config = quiet_config();
        config.localizer.k = 1;
        let (mut control, shared) = control(config, recording);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut heard = false;
        while !heard && Instant::now() < deadline {
            heard = control
                .tick(Instant::now())
                .contains(&AudioCue::LocationUpdate);
            std::thread::sleep(Duration::from_millis(2));
        }

        assert!(heard);
        assert!(!control.location_requested);
        let snapshot = shared.snapshot();
        assert!(snapshot.fixes_applied >= 1);
        // Pulled from the origin toward the hallway end at (0, 10)
        assert!(snapshot.pose.y > 3.0, "y = {}", snapshot.pose.y);
    }

    #[test]
    fn test_scan_with_nan_rssi_keeps_pose() {
        let mut recording = Recording::default();
        let mut bad_scan = RadioScan::new();
        bad_scan.insert("BEACON_ID_1", -90.0);
        bad_scan.insert("BEACON_ID_2", -50.0);
        bad_scan.insert("BEACON_ID_3", f32::NAN);
        recording.push(ReplayRecord::Scan {
            t: 0.0,
            signals: bad_scan,
        });
        standing(&mut recording, 0.0, 500);
        input(&mut recording, 0.1, InputEvent::WhereAmI);
        let mut config = quiet_config();
        config.localizer.k = 1;
        config.control.initial_pose = [0.0, 10.0, std::f32::consts::FRAC_PI_2];
        let (mut control, shared) = control(config, recording);

        let mut cues = Vec::new();
        for _ in 0..100 {
            cues.extend(control.tick(Instant::now()));
            std::thread::sleep(Duration::from_millis(2));
        }

        assert!(!cues.contains(&AudioCue::LocationUpdate));
        assert!(control.location_requested);
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.fixes_applied, 0);
        assert_eq!(snapshot.pose.x, 0.0);
        assert_eq!(snapshot.pose.y, 10.0);
    }

    #[test]
    fn test_run_stops_at_end_of_recording() {
        let mut recording = Recording::default();
        standing(&mut recording, 0.0, 10);
        let mut config = quiet_config();
        config.control.rate_hz = 200.0;
        let (mut control, shared) = control(config, recording);

        let running = AtomicBool::new(true);
        control.run(&running).unwrap();
        assert!(shared.is_finished());
        assert!(!control.device.is_powered_on());
    }

    #[test]
    fn test_run_honours_shutdown_flag() {
        let mut recording = Recording::default();
        standing(&mut recording, 0.0, 10);
        let (mut control, shared) = control(quiet_config(), recording);

        let running = AtomicBool::new(false);
        control.run(&running).unwrap();
        assert!(shared.is_finished());
        assert!(control.device.is_powered_on());
    }
}
