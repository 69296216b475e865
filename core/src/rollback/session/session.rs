//! RollbackSession core implementation

use ggrs::{Frame, GgrsError, GgrsEvent, GgrsRequest, InputStatus, SessionState};
use rollcade_shared::{InputBits, NetInput};

use crate::sim::{Simulation, StepOutcome};
use crate::state::{FrameInputs, World};

use super::super::config::{RollcadeConfig, SessionConfig};
use super::super::connection::ConnectionState;
use super::super::events::{
    DisconnectNotice, MatchEndReason, PlayerNetworkStats, SessionError, SessionEvent,
};
use super::super::loop_timer::LoopTimer;
use super::super::player::PlayerSessionConfig;
use super::super::snapshots::{SnapshotStore, SnapshotTicket};
use super::types::{FrameStatus, NetState, SessionInner, SessionType};

/// Frame advantage threshold for warning events
const FRAME_ADVANTAGE_WARNING_THRESHOLD: i32 = 4;

/// Rollback session manager
///
/// Wraps the ggrs session types behind one interface for local, sync-test
/// and P2P play. Owns the snapshot store and services every ggrs request
/// against an explicit [`World`].
pub struct RollbackSession {
    pub(super) inner: SessionInner,
    pub(super) session_type: SessionType,
    pub(super) config: SessionConfig,
    pub(super) player_config: PlayerSessionConfig,
    pub(super) snapshots: SnapshotStore,
    pub(super) loop_timer: LoopTimer,
    pub(super) local_players: Vec<usize>,
    /// Network statistics per player handle (P2P only)
    pub(super) network_stats: Vec<PlayerNetworkStats>,
    pub(super) total_rollback_frames: u64,
    /// Last frame advantage (for warning detection)
    pub(super) last_frame_advantage: i32,
    pub(super) desync_detected: bool,
    pub(super) connection: ConnectionState,
    pub(super) net_state: NetState,
    /// Set once the session is closed
    pub(super) ended: Option<MatchEndReason>,
    pub(super) disconnect_notice: Option<DisconnectNotice>,
    /// Handles that have sent at least one sync message
    pub(super) peers_seen: Vec<usize>,
    pub(super) running_announced: bool,
    /// Events raised outside `handle_events`, delivered by its next call
    pub(super) pending_events: Vec<SessionEvent>,
}

impl RollbackSession {
    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn player_config(&self) -> &PlayerSessionConfig {
        &self.player_config
    }

    pub fn local_players(&self) -> &[usize] {
        &self.local_players
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn net_state(&self) -> NetState {
        self.net_state
    }

    pub fn is_closed(&self) -> bool {
        self.ended.is_some()
    }

    /// Why the session closed, if it has
    pub fn end_reason(&self) -> Option<MatchEndReason> {
        self.ended
    }

    pub fn disconnect_notice(&self) -> Option<&DisconnectNotice> {
        self.disconnect_notice.as_ref()
    }

    /// Get current frame number
    pub fn current_frame(&self) -> i32 {
        match &self.inner {
            SessionInner::Local { current_frame, .. } => *current_frame,
            SessionInner::SyncTest { current_frame, .. } => *current_frame,
            SessionInner::P2P(session) => session.current_frame(),
        }
    }

    /// Get the current session state (for P2P sessions)
    pub fn session_state(&self) -> Option<SessionState> {
        match &self.inner {
            SessionInner::P2P(session) => Some(session.current_state()),
            _ => None,
        }
    }

    /// Whether frames may advance. Always true for local and sync-test
    /// sessions.
    pub fn is_running(&self) -> bool {
        match &self.inner {
            SessionInner::P2P(session) => session.current_state() == SessionState::Running,
            _ => true,
        }
    }

    /// Extra delay owed this loop iteration from time-sync smoothing
    pub fn wait_this_loop(&mut self) -> std::time::Duration {
        self.loop_timer.wait_this_loop()
    }

    fn closed_error(&self) -> SessionError {
        match (&self.ended, &self.disconnect_notice) {
            (Some(MatchEndReason::PeerDisconnected), Some(notice)) => SessionError::Disconnected {
                player_handle: notice.player_handle,
            },
            _ => SessionError::Closed,
        }
    }

    /// Add local input for a player
    ///
    /// Local sessions store it for the next advance; ggrs sessions pass it
    /// on for synchronization.
    pub fn add_local_input(
        &mut self,
        player_handle: usize,
        input: InputBits,
    ) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        match &mut self.inner {
            SessionInner::Local { stored_inputs, .. } => {
                if let Some(slot) = stored_inputs.get_mut(player_handle) {
                    *slot = input;
                }
                Ok(())
            }
            SessionInner::SyncTest { session, .. } => {
                Ok(session.add_local_input(player_handle, NetInput::new(input))?)
            }
            SessionInner::P2P(session) => {
                Ok(session.add_local_input(player_handle, NetInput::new(input))?)
            }
        }
    }

    /// Poll remote clients (P2P only)
    ///
    /// Must be called regularly to receive network messages.
    pub fn poll_remote_clients(&mut self) {
        if let SessionInner::P2P(session) = &mut self.inner {
            session.poll_remote_clients();
        }
    }

    fn advance_frame(&mut self) -> Result<Vec<GgrsRequest<RollcadeConfig>>, GgrsError> {
        match &mut self.inner {
            SessionInner::Local {
                current_frame,
                stored_inputs,
            } => {
                *current_frame += 1;
                let inputs = stored_inputs
                    .iter()
                    .map(|&bits| (NetInput::new(bits), InputStatus::Confirmed))
                    .collect();
                Ok(vec![GgrsRequest::AdvanceFrame { inputs }])
            }
            SessionInner::SyncTest {
                session,
                current_frame,
            } => {
                let requests = session.advance_frame()?;
                // one new frame per batch, the rest are resimulations
                if requests
                    .iter()
                    .any(|r| matches!(r, GgrsRequest::AdvanceFrame { .. }))
                {
                    *current_frame += 1;
                }
                Ok(requests)
            }
            SessionInner::P2P(session) => session.advance_frame(),
        }
    }

    /// Run every frame ggrs asks for.
    ///
    /// "No input yet" is [`FrameStatus::Stalled`], not an error. When the
    /// simulation ends the match the session closes itself, and later
    /// calls fail with [`SessionError::Closed`].
    pub fn advance<S: Simulation + ?Sized>(
        &mut self,
        world: &mut World,
        sim: &mut S,
    ) -> Result<FrameStatus, SessionError> {
        if self.is_closed() {
            return Err(self.closed_error());
        }
        self.poll_remote_clients();

        let requests = match self.advance_frame() {
            Ok(requests) => requests,
            Err(GgrsError::PredictionThreshold) | Err(GgrsError::NotSynchronized) => {
                return Ok(FrameStatus::Stalled);
            }
            Err(GgrsError::MismatchedChecksum {
                current_frame,
                mismatched_frames,
            }) => {
                return Err(self.checksum_mismatch(current_frame, &mismatched_frames));
            }
            Err(e) => {
                self.net_state = NetState::Error;
                return Err(e.into());
            }
        };
        self.handle_requests(world, sim, requests)
    }

    /// Service one batch of ggrs requests in order
    fn handle_requests<S: Simulation + ?Sized>(
        &mut self,
        world: &mut World,
        sim: &mut S,
        requests: Vec<GgrsRequest<RollcadeConfig>>,
    ) -> Result<FrameStatus, SessionError> {
        let mut frames = 0;
        let mut rolled_back = 0;
        let mut loaded = false;
        let mut outcome = StepOutcome::Continue;

        for request in requests {
            match request {
                GgrsRequest::SaveGameState { cell, frame } => {
                    let saved = self.snapshots.save(frame, world)?;
                    if self.session_type == SessionType::SyncTest
                        && let Some(previous) = saved.previous
                    {
                        return Err(self.desync(frame, saved.checksum, previous));
                    }
                    let ticket = SnapshotTicket {
                        frame,
                        checksum: saved.checksum,
                    };
                    cell.save(frame, Some(ticket), Some(u128::from(saved.checksum)));
                }
                GgrsRequest::LoadGameState { cell, frame } => {
                    let ticket = cell.load();
                    let frame = ticket.map_or(frame, |t| t.frame);
                    self.snapshots
                        .load(frame, ticket.map(|t| t.checksum), world)
                        .ok_or(SessionError::MissingSnapshot { frame })?;
                    loaded = true;
                }
                GgrsRequest::AdvanceFrame { inputs } => {
                    let bits: FrameInputs = inputs
                        .iter()
                        .map(|(input, status)| match status {
                            InputStatus::Disconnected => InputBits::empty(),
                            _ => input.bits(),
                        })
                        .collect();
                    outcome = world.advance(&bits, sim);
                    frames += 1;
                    if loaded {
                        rolled_back += 1;
                    }
                }
            }
        }

        if rolled_back > 0 {
            self.total_rollback_frames += rolled_back as u64;
            for stats in &mut self.network_stats {
                stats.rollback_frames = stats.rollback_frames.saturating_add(rolled_back as u32);
            }
        }

        if frames > 0 && outcome == StepOutcome::MatchOver {
            self.close(MatchEndReason::MatchOver);
            return Ok(FrameStatus::Ended(MatchEndReason::MatchOver));
        }
        Ok(FrameStatus::Advanced {
            frames,
            rolled_back,
        })
    }

    /// ggrs found resimulated frames whose checksums changed. It reports
    /// frames only; the checksums come from the snapshot store, with the
    /// first save of the frame standing in for the remote side.
    pub(super) fn checksum_mismatch(
        &mut self,
        current_frame: Frame,
        mismatched_frames: &[Frame],
    ) -> SessionError {
        let frame = mismatched_frames.iter().min().copied().unwrap_or(current_frame);
        let local = self.snapshots.checksum_of(frame).unwrap_or_default();
        let remote = self.snapshots.replaced_checksum(frame).unwrap_or(local);
        self.desync(frame, local, remote)
    }

    fn desync(&mut self, frame: i32, local_checksum: u64, remote_checksum: u64) -> SessionError {
        tracing::error!(
            frame,
            local = %format!("{:#x}", local_checksum),
            remote = %format!("{:#x}", remote_checksum),
            "Desync detected"
        );
        self.desync_detected = true;
        self.net_state = NetState::Error;
        self.pending_events.push(SessionEvent::Desync {
            frame,
            local_checksum,
            remote_checksum,
        });
        SessionError::Desync {
            frame,
            local_checksum,
            remote_checksum,
        }
    }

    /// End the session: release every snapshot and refuse further frames.
    pub fn close(&mut self, reason: MatchEndReason) {
        if self.ended.is_some() {
            return;
        }
        let released = self.snapshots.close();
        self.ended = Some(reason);
        if self.net_state != NetState::Error {
            self.net_state = NetState::Ended;
        }
        self.pending_events.push(SessionEvent::MatchEnded { reason });
        tracing::info!(?reason, released, "Session closed");
    }

    pub(super) fn peer_disconnected(&mut self, player_handle: usize) {
        tracing::warn!(player = player_handle, "Peer disconnected");
        if let Some(stats) = self.network_stats.get_mut(player_handle) {
            stats.connected = false;
            stats.assess_quality();
        }
        let notice = DisconnectNotice::new(player_handle);
        self.disconnect_notice = Some(notice.clone());
        self.pending_events
            .push(SessionEvent::DisconnectedFromPeer { notice });
        self.close(MatchEndReason::PeerDisconnected);
    }

    /// Drain raw ggrs events (P2P only)
    fn events(&mut self) -> Vec<GgrsEvent<RollcadeConfig>> {
        match &mut self.inner {
            SessionInner::P2P(session) => session.events().collect(),
            _ => Vec::new(),
        }
    }

    fn handle_for(&self, addr: &str) -> usize {
        match &self.inner {
            SessionInner::P2P(session) => session
                .handles_by_address(addr.to_string())
                .first()
                .copied()
                .unwrap_or_default(),
            _ => 0,
        }
    }

    /// Get frames ahead (P2P only)
    pub fn frames_ahead(&self) -> i32 {
        match &self.inner {
            SessionInner::P2P(session) => session.frames_ahead(),
            _ => 0,
        }
    }

    pub fn player_stats(&self, player_handle: usize) -> Option<&PlayerNetworkStats> {
        self.network_stats.get(player_handle)
    }

    pub fn all_player_stats(&self) -> &[PlayerNetworkStats] {
        &self.network_stats
    }

    pub fn total_rollback_frames(&self) -> u64 {
        self.total_rollback_frames
    }

    pub fn has_desync(&self) -> bool {
        self.desync_detected
    }

    /// Process GGRS events
    ///
    /// Translates raw events into [`SessionEvent`]s, updates network
    /// statistics and the connection state, and feeds time sync to the
    /// loop timer. A peer disconnect closes the session.
    pub fn handle_events(&mut self) -> Vec<SessionEvent> {
        for event in self.events() {
            self.translate(event);
        }

        if !self.running_announced && self.session_state() == Some(SessionState::Running) {
            self.running_announced = true;
            if self.net_state == NetState::Stopped {
                self.net_state = NetState::Playing;
            }
            tracing::info!("Session running");
            self.pending_events.push(SessionEvent::Running);
        }

        self.update_network_stats();

        let frames_ahead = self.frames_ahead();
        if frames_ahead >= FRAME_ADVANTAGE_WARNING_THRESHOLD
            && self.last_frame_advantage < FRAME_ADVANTAGE_WARNING_THRESHOLD
        {
            tracing::debug!(frames_ahead, "Frame advantage warning");
            self.pending_events
                .push(SessionEvent::FrameAdvantageWarning { frames_ahead });
        }
        self.last_frame_advantage = frames_ahead;

        let events = std::mem::take(&mut self.pending_events);
        for event in &events {
            self.connection = self.connection.apply(event);
        }
        events
    }

    fn translate(&mut self, event: GgrsEvent<RollcadeConfig>) {
        match event {
            GgrsEvent::Synchronizing { addr, total, count } => {
                let player_handle = self.handle_for(&addr);
                if !self.peers_seen.contains(&player_handle) {
                    self.peers_seen.push(player_handle);
                    tracing::info!(player = player_handle, "Connected to peer");
                    self.pending_events
                        .push(SessionEvent::ConnectedToPeer { player_handle });
                }
                tracing::debug!(player = player_handle, count, total, "Synchronizing");
                self.pending_events.push(SessionEvent::SynchronizingWithPeer {
                    player_handle,
                    count,
                    total,
                });
            }
            GgrsEvent::Synchronized { addr } => {
                let player_handle = self.handle_for(&addr);
                tracing::info!(player = player_handle, "Peer synchronized");
                self.pending_events
                    .push(SessionEvent::SynchronizedWithPeer { player_handle });
            }
            GgrsEvent::Disconnected { addr } => {
                let player_handle = self.handle_for(&addr);
                self.peer_disconnected(player_handle);
            }
            GgrsEvent::NetworkInterrupted {
                addr,
                disconnect_timeout,
            } => {
                let player_handle = self.handle_for(&addr);
                let timeout_ms = disconnect_timeout as u64;
                tracing::warn!(player = player_handle, timeout_ms, "Network interrupted");
                self.pending_events.push(SessionEvent::ConnectionInterrupted {
                    player_handle,
                    disconnect_timeout_ms: timeout_ms,
                });
            }
            GgrsEvent::NetworkResumed { addr } => {
                let player_handle = self.handle_for(&addr);
                tracing::info!(player = player_handle, "Network resumed");
                self.pending_events
                    .push(SessionEvent::ConnectionResumed { player_handle });
            }
            GgrsEvent::WaitRecommendation { skip_frames } => {
                self.loop_timer.on_time_sync(skip_frames);
                self.pending_events.push(SessionEvent::TimeSync {
                    frames_ahead: skip_frames,
                });
            }
            GgrsEvent::DesyncDetected {
                frame,
                local_checksum,
                remote_checksum,
                addr: _,
            } => {
                // ggrs checksums are u128 holding our u64
                let _ = self.desync(frame, local_checksum as u64, remote_checksum as u64);
            }
        }
    }

    /// Update network statistics from GGRS
    fn update_network_stats(&mut self) {
        let ggrs_stats: Vec<Option<ggrs::NetworkStats>> = match &self.inner {
            SessionInner::P2P(session) => (0..self.network_stats.len())
                .map(|player_handle| session.network_stats(player_handle).ok())
                .collect(),
            _ => return,
        };

        for (player_handle, stats) in self.network_stats.iter_mut().enumerate() {
            if self.local_players.contains(&player_handle) {
                continue;
            }
            if let Some(ggrs_stat) = ggrs_stats.get(player_handle).and_then(|s| s.as_ref()) {
                stats.ping_ms = ggrs_stat.ping as u32;
                stats.local_frames_ahead = ggrs_stat.local_frames_behind;
                stats.remote_frames_ahead = ggrs_stat.remote_frames_behind;
                stats.assess_quality();
            }
        }
    }
}
