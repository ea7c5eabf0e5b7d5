//! Lip-sync: cue indexing and the driver that maps playback time to viseme targets.
//!
//! Cues are split into one lane per viseme, sorted by start time, with a
//! running maximum of end times. A cursor per lane counts the cues that have
//! started; the lane is active iff the latest end among them reaches the
//! current time. Playback time normally only grows, so the cursor only moves
//! forward; a rewind re-seats it with a binary search.

use log::warn;

use crate::ids::ChannelHandle;
use crate::message::LipSync;
use crate::registry::{ChannelResolver, MorphChannelRegistry};
use crate::viseme::Viseme;

/// A mouth cue after phoneme mapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cue {
    pub start: f32,
    pub end: f32,
    pub viseme: Viseme,
}

#[derive(Clone, Debug, Default)]
struct Lane {
    starts: Vec<f32>,
    /// `max_end[i]` = max end over cues `0..=i` (by start order).
    max_end: Vec<f32>,
    cursor: usize,
}

impl Lane {
    fn build(mut cues: Vec<(f32, f32)>) -> Self {
        cues.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut starts = Vec::with_capacity(cues.len());
        let mut max_end = Vec::with_capacity(cues.len());
        let mut running = f32::NEG_INFINITY;
        for (s, e) in cues {
            running = running.max(e);
            starts.push(s);
            max_end.push(running);
        }
        Self {
            starts,
            max_end,
            cursor: 0,
        }
    }

    #[inline]
    fn seek(&mut self, time: f32) {
        self.cursor = self.starts.partition_point(|s| *s <= time);
    }

    #[inline]
    fn advance(&mut self, time: f32) {
        while self.cursor < self.starts.len() && self.starts[self.cursor] <= time {
            self.cursor += 1;
        }
    }

    #[inline]
    fn is_active(&self, time: f32) -> bool {
        self.cursor > 0 && self.max_end[self.cursor - 1] >= time
    }
}

/// Cue track indexed for per-frame lookup.
#[derive(Clone, Debug)]
pub struct LipSyncTrack {
    duration: f32,
    cue_count: usize,
    lanes: [Lane; Viseme::COUNT],
    last_time: Option<f32>,
}

impl LipSyncTrack {
    /// Index a wire track. Unknown phoneme codes and malformed intervals are dropped.
    pub fn from_wire(lip_sync: &LipSync) -> Self {
        let cues = lip_sync.mouth_cues.iter().filter_map(|c| {
            let viseme = Viseme::from_phoneme(&c.value)?;
            Some(Cue {
                start: c.start,
                end: c.end,
                viseme,
            })
        });
        Self::new(lip_sync.duration, cues)
    }

    pub fn new(duration: f32, cues: impl IntoIterator<Item = Cue>) -> Self {
        let mut per_lane: [Vec<(f32, f32)>; Viseme::COUNT] = Default::default();
        let mut cue_count = 0;
        for cue in cues {
            if !cue.start.is_finite() || !cue.end.is_finite() || cue.start > cue.end {
                warn!(
                    "dropping malformed mouth cue [{}, {}] for {:?}",
                    cue.start, cue.end, cue.viseme
                );
                continue;
            }
            per_lane[cue.viseme.index()].push((cue.start, cue.end));
            cue_count += 1;
        }
        Self {
            duration: if duration.is_finite() { duration } else { 0.0 },
            cue_count,
            lanes: per_lane.map(Lane::build),
            last_time: None,
        }
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Number of cues that survived indexing.
    #[inline]
    pub fn len(&self) -> usize {
        self.cue_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cue_count == 0
    }

    /// Time before the track or past its end (when the duration is known) plays nothing.
    #[inline]
    fn in_range(&self, time: f32) -> bool {
        time.is_finite() && time >= 0.0 && (self.duration <= 0.0 || time <= self.duration)
    }

    /// Move every lane's cursor to `time`; returns the per-viseme activity.
    pub fn sample(&mut self, time: f32) -> [bool; Viseme::COUNT] {
        let mut active = [false; Viseme::COUNT];
        if !time.is_finite() {
            return active;
        }
        let rewound = self.last_time.map_or(true, |last| time < last);
        for lane in &mut self.lanes {
            if rewound {
                lane.seek(time);
            } else {
                lane.advance(time);
            }
        }
        self.last_time = Some(time);

        if !self.in_range(time) {
            return active;
        }
        for (i, lane) in self.lanes.iter().enumerate() {
            active[i] = lane.is_active(time);
        }
        active
    }
}

/// Viseme channels present on the mounted mesh plus the current track.
#[derive(Clone, Debug, Default)]
pub struct LipSyncDriver {
    channels: Vec<(Viseme, ChannelHandle)>,
    track: Option<LipSyncTrack>,
}

impl LipSyncDriver {
    pub fn bind(resolver: &dyn ChannelResolver) -> Self {
        let channels = Viseme::ALL
            .iter()
            .filter_map(|v| resolver.resolve(v.channel_name()).map(|h| (*v, h)))
            .collect();
        Self {
            channels,
            track: None,
        }
    }

    pub fn channels(&self) -> &[(Viseme, ChannelHandle)] {
        &self.channels
    }

    /// Replace the whole track (or drop it).
    pub fn set_track(&mut self, lip_sync: Option<&LipSync>) {
        self.track = lip_sync.map(LipSyncTrack::from_wire);
    }

    pub fn track(&self) -> Option<&LipSyncTrack> {
        self.track.as_ref()
    }

    /// Active visemes target 1 at `attack`; the rest release to 0 at `release`.
    pub fn drive(
        &mut self,
        time: f32,
        registry: &mut MorphChannelRegistry,
        attack: f32,
        release: f32,
    ) {
        let active = match self.track.as_mut() {
            Some(track) => track.sample(time),
            None => [false; Viseme::COUNT],
        };
        for (viseme, handle) in &self.channels {
            if active[viseme.index()] {
                registry.set_target(*handle, 1.0, attack);
            } else {
                registry.set_target(*handle, 0.0, release);
            }
        }
    }
}
