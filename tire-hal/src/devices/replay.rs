//! Playback of recorded sensor sessions
//!
//! A recording is a JSON-lines file, one record per line, timestamps in
//! seconds from the start of the session:
//!
//! ```text
//! {"type":"imu","t":0.02,"accel":[0.1,0.0,9.8],"gyro":[0.0,0.0,0.01]}
//! {"type":"scan","t":5.0,"signals":{"BEACON_ID_1":-61.0}}
//! {"type":"input","t":1.0,"event":{"key":"start_navigation"}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Inertial records are
//! delivered one per `read_inertial` call; in real-time mode each is held back
//! until its timestamp has elapsed on the wall clock. A scan request returns
//! the latest recorded scan at or before the current playback time. The
//! device powers off when the inertial records run out.

use crate::core::driver::{DeviceDriver, RadioScanner};
use crate::core::types::InputEvent;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tire_core::core::types::{AudioCue, InertialSample, RadioScan};

/// One line of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayRecord {
    Imu {
        t: f32,
        accel: [f32; 3],
        gyro: [f32; 3],
    },
    Scan {
        t: f32,
        signals: RadioScan,
    },
    Input {
        t: f32,
        event: InputEvent,
    },
}

/// A parsed recording, split by stream and ordered by time
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub imu: VecDeque<(f32, InertialSample)>,
    pub scans: Vec<(f32, RadioScan)>,
    pub inputs: VecDeque<(f32, InputEvent)>,
}

impl Recording {
    /// Parse a JSON-lines recording.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut recording = Recording::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(trimmed).map_err(|source| {
                Error::Record {
                    line: index + 1,
                    source,
                }
            })?;
            recording.push(record);
        }
        recording.sort();
        Ok(recording)
    }

    /// Read and parse a recording file.
    pub fn open(path: &Path) -> Result<Self> {
        let recording = Self::parse(BufReader::new(File::open(path)?))?;
        log::info!(
            "[Replay] Loaded {}: {} imu, {} scans, {} inputs",
            path.display(),
            recording.imu.len(),
            recording.scans.len(),
            recording.inputs.len()
        );
        Ok(recording)
    }

    pub fn push(&mut self, record: ReplayRecord) {
        match record {
            ReplayRecord::Imu { t, accel, gyro } => {
                self.imu.push_back((t, InertialSample::new(accel, gyro)))
            }
            ReplayRecord::Scan { t, signals } => self.scans.push((t, signals)),
            ReplayRecord::Input { t, event } => self.inputs.push_back((t, event)),
        }
    }

    fn sort(&mut self) {
        self.imu
            .make_contiguous()
            .sort_by(|a, b| a.0.total_cmp(&b.0));
        self.scans.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.inputs
            .make_contiguous()
            .sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    /// Timestamp of the last inertial record
    pub fn duration(&self) -> f32 {
        self.imu.back().map(|(t, _)| *t).unwrap_or(0.0)
    }
}

/// Device replaying a [`Recording`]
pub struct ReplayDevice {
    imu: VecDeque<(f32, InertialSample)>,
    inputs: VecDeque<(f32, InputEvent)>,
    scans: Option<Arc<Vec<(f32, RadioScan)>>>,
    /// Timestamp of the last delivered inertial record
    playback_t: Arc<RwLock<f32>>,
    /// Gap between the last two delivered inertial records
    interval: Option<f32>,
    last_imu_t: Option<f32>,
    realtime: bool,
    started: Option<Instant>,
}

impl ReplayDevice {
    pub fn new(recording: Recording, realtime: bool) -> Self {
        Self {
            imu: recording.imu,
            inputs: recording.inputs,
            scans: Some(Arc::new(recording.scans)),
            playback_t: Arc::new(RwLock::new(0.0)),
            interval: None,
            last_imu_t: None,
            realtime,
            started: None,
        }
    }

    pub fn open(path: &Path, realtime: bool) -> Result<Self> {
        Ok(Self::new(Recording::open(path)?, realtime))
    }

    /// Current playback time (seconds into the recording)
    pub fn playback_time(&self) -> f32 {
        *self.playback_t.read()
    }
}

impl DeviceDriver for ReplayDevice {
    fn name(&self) -> &str {
        "replay"
    }

    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "[Replay] Starting playback ({})",
            if self.realtime { "real time" } else { "fast" }
        );
        self.started = Some(Instant::now());
        Ok(())
    }

    fn read_inertial(&mut self) -> Result<InertialSample> {
        let started = self.started.ok_or(Error::NotInitialized)?;
        let (t, sample) = self.imu.pop_front().ok_or(Error::EndOfRecording)?;

        if self.realtime {
            let due = Duration::try_from_secs_f32(t).unwrap_or(Duration::ZERO);
            let elapsed = started.elapsed();
            if due > elapsed {
                std::thread::sleep(due - elapsed);
            }
        }
        self.interval = self.last_imu_t.map(|previous| (t - previous).max(0.0));
        self.last_imu_t = Some(t);
        *self.playback_t.write() = t;
        Ok(sample)
    }

    fn sample_interval(&self) -> Option<f32> {
        self.interval
    }

    fn radio_scanner(&mut self) -> Result<Box<dyn RadioScanner>> {
        let scans = self.scans.take().ok_or(Error::ScannerTaken)?;
        Ok(Box::new(ReplayScanner {
            scans,
            playback_t: Arc::clone(&self.playback_t),
            realtime: self.realtime,
        }))
    }

    fn play_cue(&mut self, cue: &AudioCue) -> Result<()> {
        log::info!(
            "[Replay] Audio cue at {:.2}s: '{}'",
            self.playback_time(),
            cue.id()
        );
        Ok(())
    }

    fn read_input(&mut self) -> Option<InputEvent> {
        let (t, _) = self.inputs.front()?;
        if *t > self.playback_time() {
            return None;
        }
        self.inputs.pop_front().map(|(_, event)| event)
    }

    fn is_powered_on(&self) -> bool {
        !self.imu.is_empty()
    }
}

/// Scanner answering from the recorded scans
pub struct ReplayScanner {
    scans: Arc<Vec<(f32, RadioScan)>>,
    playback_t: Arc<RwLock<f32>>,
    realtime: bool,
}

impl ReplayScanner {
    /// Latest recorded scan at or before `t`; empty if none
    pub fn scan_at(&self, t: f32) -> RadioScan {
        let idx = self.scans.partition_point(|(ts, _)| *ts <= t);
        match idx {
            0 => RadioScan::new(),
            i => self.scans[i - 1].1.clone(),
        }
    }
}

impl RadioScanner for ReplayScanner {
    fn scan(&mut self, window: Duration) -> Result<RadioScan> {
        if self.realtime {
            std::thread::sleep(window);
        }
        let t = *self.playback_t.read();
        Ok(self.scan_at(t))
    }
}
