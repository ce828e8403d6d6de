//! Interactive JSON lines session.
//!
//! Reads [`Command`]s from a reader, drives one engine, and writes
//! [`Response`]s to a writer. Rule violations come back as `error` lines;
//! the session keeps going.

use std::io::{self, BufRead, Write};

use gridiron_core::prelude::*;
use std::result::Result;
use tracing::{debug, info, warn};

use crate::protocol::{Command, Response, StateView};
use crate::scenario::{Scenario, ScenarioError};

/// Engine plus playbook for an interactive controller.
#[derive(Debug)]
pub struct Session {
    engine: PlayEngine,
    playbook: Playbook,
    auto_state: bool,
}

impl Session {
    /// Session set up from `scenario`.
    pub fn from_scenario(scenario: &Scenario, auto_state: bool) -> Result<Self, ScenarioError> {
        let playbook = scenario.playbook()?;
        let engine = scenario.build_engine(&playbook)?;
        Ok(Self {
            engine,
            playbook,
            auto_state,
        })
    }

    /// Engine being driven.
    #[must_use]
    pub const fn engine(&self) -> &PlayEngine {
        &self.engine
    }

    fn label(&self, label: &str, cmd: &str) -> Result<PlayerId, Response> {
        self.engine
            .state()
            .offense()
            .find(|p| p.label == label)
            .map(|p| p.id)
            .ok_or_else(|| Response::error(format!("no player labelled '{label}'"), Some(cmd)))
    }

    fn state(&self) -> Response {
        Response::State(StateView::from_state(self.engine.state()))
    }

    fn checked(ok: bool, cmd: &Command) -> Response {
        if ok {
            Response::ack(cmd.name())
        } else {
            Response::error("rejected by the engine", Some(cmd.name()))
        }
    }

    /// Handle one command. Returns the responses to write.
    pub fn handle(&mut self, cmd: &Command) -> Vec<Response> {
        let name = cmd.name();

        let response = match cmd {
            Command::Tick { count } => {
                let was_live = self.engine.phase().is_live();
                let step = self.engine.config().default_step;
                for _ in 0..*count {
                    self.engine.tick(step);
                }
                let mut out = Vec::new();
                if was_live && self.engine.phase() == Phase::PlayOver {
                    if let Some(outcome) = self.engine.outcome() {
                        out.push(Response::PlayOver {
                            outcome: outcome.clone(),
                        });
                    }
                }
                out.push(self.state());
                return out;
            }
            Command::Query => self.state(),
            Command::SetConcept { name: concept } => match self.playbook.require_concept(concept) {
                Ok(concept) => Self::checked(self.engine.set_play_concept(concept), cmd),
                Err(e) => Response::error(e.to_string(), Some(name)),
            },
            Command::SetCoverage { name: coverage } => match self.playbook.require_coverage(coverage) {
                Ok(coverage) => Self::checked(self.engine.set_coverage(coverage), cmd),
                Err(e) => Response::error(e.to_string(), Some(name)),
            },
            Command::SetLineOfScrimmage { yard } => {
                Self::checked(self.engine.set_line_of_scrimmage(*yard), cmd)
            }
            Command::SetHash { hash } => Self::checked(self.engine.set_hash_position(*hash), cmd),
            Command::SetPersonnel { code } => Self::checked(self.engine.set_personnel(code), cmd),
            Command::Audible { label, route } => match self.label(label, name) {
                Ok(id) => Self::checked(self.engine.audible_route(id, *route), cmd),
                Err(e) => e,
            },
            Command::HotRoute { label, route } => match self.label(label, name) {
                Ok(id) => Self::checked(self.engine.apply_hot_route(id, *route), cmd),
                Err(e) => e,
            },
            Command::SightAdjust { label } => match self.label(label, name) {
                Ok(id) => Self::checked(self.engine.apply_sight_adjustment(id), cmd),
                Err(e) => e,
            },
            Command::Motion { label, motion } => match self.label(label, name) {
                Ok(id) => Self::checked(self.engine.send_in_motion(id, *motion), cmd),
                Err(e) => e,
            },
            Command::FinishMotion => {
                let step = self.engine.config().default_step;
                let mut advanced = false;
                while self.engine.advance_motion(step) {
                    advanced = true;
                }
                Self::checked(advanced, cmd)
            }
            Command::Snap => Self::checked(self.engine.snap(), cmd),
            Command::Throw { label } => match self.label(label, name) {
                Ok(id) => Self::checked(self.engine.throw_to(id), cmd),
                Err(e) => e,
            },
            Command::NextPlay => match self.engine.advance_to_next_play() {
                Some(result) => Response::NextPlay {
                    result,
                    drive: self.engine.state().drive.clone(),
                },
                None => Response::error("play not over", Some(name)),
            },
            Command::Reset => {
                self.engine.reset();
                Response::ack(name)
            }
            Command::ReplayFromSnap => Self::checked(self.engine.replay_from_snap(), cmd),
            Command::Hash => Response::StateHash {
                tick: self.engine.state().tick,
                hash: self.engine.state_hash(),
            },
            Command::Quit => Response::Bye,
        };

        let mut out = vec![response];
        if self.auto_state && !matches!(cmd, Command::Query | Command::Quit) {
            out.push(self.state());
        }
        out
    }

    /// Serve commands from `reader` until EOF or `quit`.
    pub fn serve<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> io::Result<()> {
        writer.write_all(Response::ready().to_json_line().as_bytes())?;
        writer.flush()?;
        info!("Session ready");

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (responses, quit) = match Command::from_json(trimmed) {
                Ok(cmd) => {
                    debug!(cmd = cmd.name(), "Command");
                    (self.handle(&cmd), cmd == Command::Quit)
                }
                Err(e) => {
                    warn!(error = %e, "Unparseable command");
                    (vec![Response::error(format!("Invalid command: {e}"), None)], false)
                }
            };
            for response in &responses {
                writer.write_all(response.to_json_line().as_bytes())?;
            }
            writer.flush()?;
            if quit {
                info!("Session closed by controller");
                return Ok(());
            }
        }
        Ok(())
    }
}
