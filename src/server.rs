//! HTTP transport for a remote renderer
//!
//! The renderer drives the simulation by POSTing JSON requests:
//!
//! - `{"request": "board-init"}` - board size as `{"m", "n"}`
//! - `{"request": "lights-init"}` - light positions; opens the session
//! - `{"request": "step"}` - advances one tick and returns the deltas
//!
//! Anything else, or a step before the session is open, gets
//! `{"order": "wait"}`. Once the run's wall-clock budget is spent every
//! request is answered with `{"order": "stop"}` and the serve loop ends.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::simulation::{Items, SimStats, SimWorld};

/// Default port the renderer connects to
pub const DEFAULT_PORT: u16 = 8585;

/// Whether the serve loop should keep accepting requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeStatus {
    Continue,
    Stop,
}

/// A response body plus what the serve loop should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub body: String,
    pub status: ServeStatus,
}

#[derive(Deserialize)]
struct SimRequest {
    request: String,
}

#[derive(Serialize)]
struct Order {
    order: &'static str,
}

#[derive(Serialize)]
struct StepReply {
    #[serde(rename = "carsJson")]
    cars_json: String,
    #[serde(rename = "lightsJson")]
    lights_json: String,
}

/// Outcome of a finished serve loop
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub elapsed: Duration,
    pub max_duration: Duration,
    pub deadline_reached: bool,
    pub stats: SimStats,
}

impl RunReport {
    pub fn log(&self) {
        info!("=== SERVER STOPPED ===");
        if self.deadline_reached || self.elapsed >= self.max_duration {
            info!(
                "Run time: {}s (maximum allowed duration)",
                self.max_duration.as_secs()
            );
        } else {
            info!(
                "Run time: {:.3}s (finished before the deadline)",
                self.elapsed.as_secs_f64()
            );
        }
        info!("Ticks run: {}", self.stats.ticks);
        info!("Total cars spawned: {}", self.stats.cars_spawned);
        info!("Total cars removed: {}", self.stats.cars_removed);
    }
}

/// Owns one world and answers renderer requests against it
pub struct SimulationServer {
    world: SimWorld,
    started: Instant,
    max_duration: Duration,
    initialized: bool,
    deadline_reached: bool,
}

impl SimulationServer {
    pub fn new(world: SimWorld) -> Self {
        let max_duration = world.config().max_duration;
        Self {
            world,
            started: Instant::now(),
            max_duration,
            initialized: false,
            deadline_reached: false,
        }
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Answer a request body, measuring the deadline from server start
    pub fn handle(&mut self, body: &str) -> Result<Reply> {
        let elapsed = self.started.elapsed();
        self.handle_at(body, elapsed)
    }

    /// Answer a request body as if `elapsed` time had passed since start
    ///
    /// Only an engine fault is an error; unknown requests degrade to wait.
    pub fn handle_at(&mut self, body: &str, elapsed: Duration) -> Result<Reply> {
        if elapsed >= self.max_duration {
            self.deadline_reached = true;
            return Ok(Reply {
                body: serde_json::to_string(&Order { order: "stop" })?,
                status: ServeStatus::Stop,
            });
        }

        let request = serde_json::from_str::<SimRequest>(body)
            .ok()
            .map(|r| r.request);
        debug!("Request: {:?}", request);

        let body = match request.as_deref() {
            Some("board-init") => serde_json::to_string(&self.world.init_board())?,
            Some("lights-init") => {
                self.initialized = true;
                let lights = self.world.init_lights();
                serde_json::to_string(&Items::new(&lights))?
            }
            Some("step") if self.initialized => {
                let delta = self.world.step().context("simulation step failed")?;
                let reply = StepReply {
                    cars_json: serde_json::to_string(&Items::new(&delta.cars))?,
                    lights_json: serde_json::to_string(&Items::new(&delta.lights))?,
                };
                serde_json::to_string(&reply)?
            }
            _ => serde_json::to_string(&Order { order: "wait" })?,
        };

        Ok(Reply {
            body,
            status: ServeStatus::Continue,
        })
    }

    /// Serve requests on `port` until the deadline stops the run
    pub fn serve(mut self, port: u16) -> Result<RunReport> {
        let addr = format!("0.0.0.0:{}", port);
        let server =
            Server::http(&addr).map_err(|e| anyhow!("failed to start server on {}: {}", addr, e))?;

        info!("Server listening on http://127.0.0.1:{}", port);
        self.started = Instant::now();

        for request in server.incoming_requests() {
            if self.respond(request)? == ServeStatus::Stop {
                break;
            }
        }

        Ok(self.report())
    }

    fn respond(&mut self, mut request: Request) -> Result<ServeStatus> {
        if *request.method() == Method::Get {
            let body = format!("GET request for {}", request.url());
            if let Err(e) = request.respond(Response::from_string(body)) {
                warn!("Failed to answer GET: {}", e);
            }
            return Ok(ServeStatus::Continue);
        }

        let mut body = String::new();
        if let Err(e) = request.as_reader().read_to_string(&mut body) {
            warn!("Failed to read request body: {}", e);
            body.clear();
        }

        let reply = self.handle(&body)?;
        let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
            .map_err(|_| anyhow!("invalid content type header"))?;
        if let Err(e) = request.respond(Response::from_string(reply.body).with_header(header)) {
            warn!("Failed to send reply: {}", e);
        }
        Ok(reply.status)
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            elapsed: self.started.elapsed(),
            max_duration: self.max_duration,
            deadline_reached: self.deadline_reached,
            stats: self.world.stats(),
        }
    }
}
