//! Room task: drives both ticks and all inputs on one execution context

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::util::time::{COUNTDOWN_INTERVAL, UPDATE_INTERVAL};

use super::mode::ModeKind;
use super::room::{GameOverReport, LoopObserver, RoomError, RoomPhase, RoomSimulation};
use super::snapshot::RoomSnapshot;
use super::Vec3;

/// Requests routed into a room task
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        user_id: String,
        display_name: String,
        char_type: u8,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        user_id: String,
    },
    Start {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Move {
        user_id: String,
        velocity: Vec3,
    },
    UseItem {
        user_id: String,
    },
    UseSkill {
        user_id: String,
    },
    Steal {
        user_id: String,
    },
}

/// Events fanned out to every subscriber of a room
#[derive(Debug, Clone)]
pub enum RoomEvent {
    State(RoomSnapshot),
    GameOver(GameOverReport),
}

/// Forwards simulation output to the room's broadcast channel
struct BroadcastObserver {
    events_tx: broadcast::Sender<RoomEvent>,
}

impl LoopObserver for BroadcastObserver {
    fn on_tick(&mut self, snapshot: &RoomSnapshot) {
        // no subscribers is fine
        let _ = self.events_tx.send(RoomEvent::State(snapshot.clone()));
    }

    fn on_game_over(&mut self, report: &GameOverReport) {
        let _ = self.events_tx.send(RoomEvent::GameOver(report.clone()));
    }
}

/// Cloneable handle to a running room task
#[derive(Debug, Clone)]
pub struct RoomHandle {
    pub room_id: String,
    pub mode: ModeKind,
    command_tx: mpsc::Sender<RoomCommand>,
    events_tx: broadcast::Sender<RoomEvent>,
    stop_tx: Arc<watch::Sender<bool>>,
    player_count: Arc<AtomicUsize>,
    started: Arc<AtomicBool>,
}

impl RoomHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events_tx.subscribe()
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    /// Queue a fire-and-forget command. Dropped if the room is gone.
    pub async fn send(&self, command: RoomCommand) {
        if self.command_tx.send(command).await.is_err() {
            debug!(room_id = %self.room_id, "Room task gone, command dropped");
        }
    }

    pub async fn join(&self, user_id: &str, display_name: &str, char_type: u8) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(RoomCommand::Join {
                user_id: user_id.to_string(),
                display_name: display_name.to_string(),
                char_type,
                reply,
            })
            .await
            .map_err(|_| RoomError::Terminated)?;
        rx.await.unwrap_or(Err(RoomError::Terminated))
    }

    pub async fn start(&self) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(RoomCommand::Start { reply })
            .await
            .map_err(|_| RoomError::Terminated)?;
        rx.await.unwrap_or(Err(RoomError::Terminated))
    }

    /// Cancel the room loop. Repeated calls are no-ops.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}

enum Wake {
    Stop,
    Command(Option<RoomCommand>),
    Countdown,
    Simulate,
}

/// Owns one room's simulation for the lifetime of the match
pub struct RoomTask {
    sim: RoomSimulation,
    command_rx: mpsc::Receiver<RoomCommand>,
    events_tx: broadcast::Sender<RoomEvent>,
    stop_rx: watch::Receiver<bool>,
    player_count: Arc<AtomicUsize>,
    started: Arc<AtomicBool>,
    countdown: Option<Interval>,
    simulation: Option<Interval>,
}

impl RoomTask {
    pub fn new(sim: RoomSimulation) -> (Self, RoomHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (events_tx, _) = broadcast::channel(64);
        let (stop_tx, stop_rx) = watch::channel(false);
        let player_count = Arc::new(AtomicUsize::new(sim.characters().len()));
        let started = Arc::new(AtomicBool::new(sim.phase() == RoomPhase::Running));

        let handle = RoomHandle {
            room_id: sim.room_id().to_string(),
            mode: sim.mode(),
            command_tx,
            events_tx: events_tx.clone(),
            stop_tx: Arc::new(stop_tx),
            player_count: player_count.clone(),
            started: started.clone(),
        };

        let task = Self {
            sim,
            command_rx,
            events_tx,
            stop_rx,
            player_count,
            started,
            countdown: None,
            simulation: None,
        };

        (task, handle)
    }

    /// Run until the room terminates. Returns the game-over report if the
    /// match ended on its own.
    pub async fn run(mut self) -> Option<GameOverReport> {
        let room_id = self.sim.room_id().to_string();
        info!(room_id = %room_id, "Room task started");

        let mut report = None;
        loop {
            let wake = tokio::select! {
                biased;
                changed = self.stop_rx.changed() => match changed {
                    Ok(()) if !*self.stop_rx.borrow() => continue,
                    _ => Wake::Stop,
                },
                _ = next_tick(&mut self.countdown) => Wake::Countdown,
                _ = next_tick(&mut self.simulation) => Wake::Simulate,
                command = self.command_rx.recv() => Wake::Command(command),
            };

            match wake {
                Wake::Stop => self.sim.stop_loop(),
                Wake::Countdown => report = self.sim.countdown_tick(),
                Wake::Simulate => {
                    self.sim.simulation_tick();
                }
                Wake::Command(Some(command)) => self.handle_command(command),
                Wake::Command(None) => {
                    debug!(room_id = %room_id, "All room handles dropped");
                    self.sim.stop_loop();
                }
            }

            if self.sim.phase() == RoomPhase::Terminated {
                break;
            }
        }

        info!(room_id = %room_id, "Room task finished");
        report
    }

    fn handle_command(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join {
                user_id,
                display_name,
                char_type,
                reply,
            } => {
                let result = self.sim.add_character(&user_id, &display_name, char_type);
                if let Err(e) = &result {
                    warn!(room_id = %self.sim.room_id(), user_id = %user_id, error = %e, "Join rejected");
                }
                self.sync_player_count();
                let _ = reply.send(result);
            }
            RoomCommand::Leave { user_id } => {
                self.sim.remove_character(&user_id);
                self.sync_player_count();
            }
            RoomCommand::Start { reply } => {
                let observer = BroadcastObserver {
                    events_tx: self.events_tx.clone(),
                };
                let result = self.sim.start_loop(Box::new(observer));
                if result.is_ok() {
                    self.arm_timers();
                    self.started.store(true, Ordering::Relaxed);
                }
                let _ = reply.send(result);
            }
            RoomCommand::Move { user_id, velocity } => {
                self.sim.set_velocity(&user_id, velocity);
            }
            RoomCommand::UseItem { user_id } => {
                self.sim.use_item(&user_id);
            }
            RoomCommand::UseSkill { user_id } => {
                self.sim.request_ability(&user_id);
            }
            RoomCommand::Steal { user_id } => {
                self.sim.steal(&user_id);
            }
        }
    }

    fn arm_timers(&mut self) {
        let now = Instant::now();
        let mut countdown = interval_at(now + COUNTDOWN_INTERVAL, COUNTDOWN_INTERVAL);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut simulation = interval_at(now + UPDATE_INTERVAL, UPDATE_INTERVAL);
        simulation.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.countdown = Some(countdown);
        self.simulation = Some(simulation);
    }

    fn sync_player_count(&self) {
        self.player_count
            .store(self.sim.characters().len(), Ordering::Relaxed);
    }
}

/// Resolves on the next tick, or never if the timer is not armed
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
