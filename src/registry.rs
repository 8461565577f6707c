use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rep_counter::{
    ConfigError, Exercise, ExerciseConfig, FrameOutcome, Landmark, Phase, SessionController,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

use crate::config::SessionLimits;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("session {0} not found")]
    NotFound(Uuid),
    #[error("session limit of {max} reached")]
    CapacityReached { max: usize },
    #[error("frame sequence {sequence} is not newer than {last}")]
    StaleFrame { sequence: u64, last: u64 },
    #[error("frame carries {len} landmarks, limit is {max}")]
    FrameTooLarge { len: usize, max: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub exercise: Exercise,
    pub target_angle: f64,
    pub threshold_angle: f64,
    pub rep_count: u32,
    pub phase: Phase,
    pub frames_processed: u64,
    pub last_feedback: &'static str,
    pub last_sequence: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub active_sessions: usize,
    pub in_position: usize,
    pub total_reps: u64,
    pub frames_processed: u64,
}

struct SessionEntry {
    controller: SessionController,
    last_sequence: Option<u64>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    events: broadcast::Sender<FrameOutcome>,
}

impl SessionEntry {
    fn new(config: ExerciseConfig) -> Self {
        let now = Utc::now();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            controller: SessionController::new(config),
            last_sequence: None,
            created_at: now,
            last_active_at: now,
            events,
        }
    }

    fn snapshot(&self, id: Uuid) -> SessionSnapshot {
        let config = self.controller.config();
        SessionSnapshot {
            id,
            exercise: config.exercise,
            target_angle: config.target_angle,
            threshold_angle: config.threshold_angle,
            rep_count: self.controller.rep_count(),
            phase: self.controller.phase(),
            frames_processed: self.controller.frames_processed(),
            last_feedback: self.controller.last_message(),
            last_sequence: self.last_sequence,
            created_at: self.created_at,
            last_active_at: self.last_active_at,
        }
    }

    fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }
}

/// 会话表：每个会话一把 tokio Mutex，帧处理与重置在同一把锁下串行，
/// 不同会话之间互不共享状态。
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<SessionEntry>>>>,
    limits: SessionLimits,
}

impl SessionRegistry {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limits,
        }
    }

    pub fn limits(&self) -> &SessionLimits {
        &self.limits
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn create(&self, config: ExerciseConfig) -> Result<SessionSnapshot, RegistryError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.limits.max_sessions {
            return Err(RegistryError::CapacityReached {
                max: self.limits.max_sessions,
            });
        }

        let id = Uuid::new_v4();
        let entry = SessionEntry::new(config);
        let snapshot = entry.snapshot(id);
        sessions.insert(id, Arc::new(Mutex::new(entry)));

        tracing::info!(
            session_id = %id,
            exercise = %config.exercise,
            target_angle = config.target_angle,
            "session created"
        );
        Ok(snapshot)
    }

    async fn entry(&self, id: Uuid) -> Result<Arc<Mutex<SessionEntry>>, RegistryError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionSnapshot, RegistryError> {
        let entry = self.entry(id).await?;
        let guard = entry.lock().await;
        Ok(guard.snapshot(id))
    }

    pub async fn list(&self) -> Vec<SessionSnapshot> {
        let entries: Vec<(Uuid, Arc<Mutex<SessionEntry>>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect();

        let mut snapshots = Vec::with_capacity(entries.len());
        for (id, entry) in entries {
            snapshots.push(entry.lock().await.snapshot(id));
        }
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        snapshots
    }

    pub async fn remove(&self, id: Uuid) -> Result<SessionSnapshot, RegistryError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(RegistryError::NotFound(id))?;
        let snapshot = entry.lock().await.snapshot(id);
        tracing::info!(session_id = %id, rep_count = snapshot.rep_count, "session ended");
        Ok(snapshot)
    }

    /// Runs one frame through the session. `sequence`, when given, must be
    /// strictly greater than the last accepted one.
    pub async fn process_frame(
        &self,
        id: Uuid,
        sequence: Option<u64>,
        frame: &[Option<Landmark>],
    ) -> Result<FrameOutcome, RegistryError> {
        if frame.len() > self.limits.max_landmarks_per_frame {
            return Err(RegistryError::FrameTooLarge {
                len: frame.len(),
                max: self.limits.max_landmarks_per_frame,
            });
        }

        let entry = self.entry(id).await?;
        let mut guard = entry.lock().await;

        if let (Some(sequence), Some(last)) = (sequence, guard.last_sequence) {
            if sequence <= last {
                tracing::debug!(session_id = %id, sequence, last, "stale frame rejected");
                return Err(RegistryError::StaleFrame { sequence, last });
            }
        }

        let outcome = guard.controller.process_frame(frame);
        if sequence.is_some() {
            guard.last_sequence = sequence;
        }
        guard.touch();

        // 没有订阅者时 send 返回 Err，忽略即可
        let _ = guard.events.send(outcome.clone());
        Ok(outcome)
    }

    pub async fn reset(&self, id: Uuid, rep_count: u32) -> Result<SessionSnapshot, RegistryError> {
        self.update(id, |controller| controller.reset(rep_count)).await
    }

    pub async fn switch_exercise(
        &self,
        id: Uuid,
        config: ExerciseConfig,
    ) -> Result<SessionSnapshot, RegistryError> {
        self.update(id, |controller| controller.switch_exercise(config))
            .await
    }

    /// 目标角按会话当前的动作校验，校验与写入在同一把锁下完成
    pub async fn set_target_angle(
        &self,
        id: Uuid,
        target_angle: f64,
    ) -> Result<SessionSnapshot, RegistryError> {
        self.try_update(id, |controller| {
            ExerciseConfig::with_target(controller.exercise(), target_angle).validate()?;
            controller.set_target_angle(target_angle);
            Ok(())
        })
        .await
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> Result<SessionSnapshot, RegistryError>
    where
        F: FnOnce(&mut SessionController),
    {
        self.try_update(id, |controller| {
            apply(controller);
            Ok(())
        })
        .await
    }

    async fn try_update<F>(&self, id: Uuid, apply: F) -> Result<SessionSnapshot, RegistryError>
    where
        F: FnOnce(&mut SessionController) -> Result<(), ConfigError>,
    {
        let entry = self.entry(id).await?;
        let mut guard = entry.lock().await;
        apply(&mut guard.controller)?;
        guard.touch();
        Ok(guard.snapshot(id))
    }

    pub async fn subscribe(
        &self,
        id: Uuid,
    ) -> Result<broadcast::Receiver<FrameOutcome>, RegistryError> {
        let entry = self.entry(id).await?;
        let guard = entry.lock().await;
        Ok(guard.events.subscribe())
    }

    /// Drops sessions idle for longer than `max_idle`. Sessions whose lock is
    /// held right now are in use and kept.
    pub async fn evict_idle(&self, max_idle: std::time::Duration) -> usize {
        let Some(cutoff) = ChronoDuration::from_std(max_idle)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };
        self.evict_inactive_since(cutoff).await
    }

    async fn evict_inactive_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| match entry.try_lock() {
            Ok(guard) => {
                let keep = guard.last_active_at > cutoff;
                if !keep {
                    tracing::debug!(session_id = %id, "evicting idle session");
                }
                keep
            }
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn stats(&self) -> RegistryStats {
        let entries: Vec<Arc<Mutex<SessionEntry>>> =
            self.sessions.read().await.values().cloned().collect();

        let mut stats = RegistryStats {
            active_sessions: entries.len(),
            ..RegistryStats::default()
        };
        for entry in entries {
            let guard = entry.lock().await;
            stats.total_reps += u64::from(guard.controller.rep_count());
            stats.frames_processed += guard.controller.frames_processed();
            if guard.controller.phase() == Phase::InPosition {
                stats.in_position += 1;
            }
        }
        stats
    }
}
