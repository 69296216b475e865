//! Session construction and initialization

use std::time::Duration;

use ggrs::{NonBlockingSocket, PlayerType, SessionBuilder};
use rollcade_shared::InputBits;

use super::super::config::{RollcadeConfig, SessionConfig};
use super::super::connection::ConnectionState;
use super::super::events::{PlayerNetworkStats, SessionError};
use super::super::loop_timer::LoopTimer;
use super::super::player::PlayerSessionConfig;
use super::super::snapshots::SnapshotStore;
use super::session::RollbackSession;
use super::types::{NetState, SessionInner, SessionType};

impl RollbackSession {
    fn from_parts(
        inner: SessionInner,
        session_type: SessionType,
        config: SessionConfig,
        player_config: PlayerSessionConfig,
    ) -> Self {
        let networked = session_type == SessionType::P2P;
        let network_stats = if networked {
            (0..config.num_players)
                .map(|_| PlayerNetworkStats {
                    connected: true,
                    ..Default::default()
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            inner,
            session_type,
            snapshots: SnapshotStore::new(config.max_prediction_frames),
            loop_timer: LoopTimer::new(config.fps as u32, config.frames_to_spread_wait),
            local_players: player_config.local_players(),
            player_config,
            config,
            network_stats,
            total_rollback_frames: 0,
            last_frame_advantage: 0,
            desync_detected: false,
            connection: if networked {
                ConnectionState::Connecting
            } else {
                ConnectionState::Running
            },
            net_state: if networked {
                NetState::Stopped
            } else {
                NetState::Playing
            },
            ended: None,
            disconnect_notice: None,
            peers_seen: Vec::new(),
            running_announced: !networked,
            pending_events: Vec::new(),
        }
    }

    /// Create a new local session (no rollback)
    ///
    /// Updates execute immediately with the inputs stored by
    /// `add_local_input`. All players are local.
    pub fn new_local(num_players: usize) -> Self {
        let config = SessionConfig::local(num_players);
        let player_config = PlayerSessionConfig::all_local(num_players);
        Self::from_parts(
            SessionInner::Local {
                current_frame: 0,
                stored_inputs: vec![InputBits::empty(); num_players],
            },
            SessionType::Local,
            config,
            player_config,
        )
    }

    /// Create a new sync test session
    ///
    /// Every frame rolls back `check_distance` frames and resimulates,
    /// comparing checksums of the re-saved frames.
    pub fn new_sync_test(config: SessionConfig) -> Result<Self, SessionError> {
        let session = SessionBuilder::<RollcadeConfig>::new()
            .with_num_players(config.num_players)
            .with_max_prediction_window(config.max_prediction_frames)
            .with_input_delay(config.effective_input_delay())
            .with_check_distance(config.effective_check_distance())
            .start_synctest_session()?;

        let player_config = PlayerSessionConfig::all_local(config.num_players);
        Ok(Self::from_parts(
            SessionInner::SyncTest {
                session: Box::new(session),
                current_frame: 0,
            },
            SessionType::SyncTest,
            config,
            player_config,
        ))
    }

    /// Create a new P2P session over `socket`
    ///
    /// `players` lists every handle with its ggrs player type; the local
    /// handles are the ones marked `PlayerType::Local`.
    pub fn new_p2p<Sock>(
        config: SessionConfig,
        socket: Sock,
        players: Vec<(usize, PlayerType<String>)>,
    ) -> Result<Self, SessionError>
    where
        Sock: NonBlockingSocket<String> + 'static,
    {
        let player_config = PlayerSessionConfig::from_players(config.num_players, &players);

        let mut builder = SessionBuilder::<RollcadeConfig>::new()
            .with_num_players(config.num_players)
            .with_max_prediction_window(config.max_prediction_frames)
            .with_input_delay(config.effective_input_delay())
            .with_fps(config.fps)?
            .with_disconnect_timeout(Duration::from_millis(config.disconnect_timeout))
            .with_disconnect_notify_delay(Duration::from_millis(config.disconnect_notify_start));

        for (handle, player_type) in players {
            builder = builder.add_player(player_type, handle)?;
        }

        let session = builder.start_p2p_session(socket)?;
        tracing::info!(
            players = config.num_players,
            local = ?player_config.local_players(),
            "P2P session started"
        );

        Ok(Self::from_parts(
            SessionInner::P2P(Box::new(session)),
            SessionType::P2P,
            config,
            player_config,
        ))
    }
}
