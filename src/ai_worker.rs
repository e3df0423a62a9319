use crate::ai::{OpenRouterClient, parse_questions};
use crate::logger;
use crate::models::{AiRequest, AiResponse};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

/// Runs generation requests off the UI thread. One request at a time; the
/// controller's in-flight guard keeps a second request from being queued
/// while one is outstanding.
pub fn spawn_ai_worker(
    ai_tx: Sender<AiResponse>,
    ai_rx: Receiver<AiRequest>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("tka-simulator::ai_worker".to_string())
        .spawn(move || {
            loop {
                match ai_rx.recv() {
                    Ok(AiRequest::Generate { topics }) => {
                        logger::log("Worker received generation request");

                        let client = match OpenRouterClient::new() {
                            Ok(client) => client,
                            Err(e) => {
                                let _ = ai_tx.send(AiResponse::Failed {
                                    error: format!("Failed to create AI client: {}", e),
                                });
                                continue;
                            }
                        };

                        let rt = match tokio::runtime::Runtime::new() {
                            Ok(rt) => rt,
                            Err(e) => {
                                let _ = ai_tx.send(AiResponse::Failed {
                                    error: format!("Failed to start async runtime: {}", e),
                                });
                                continue;
                            }
                        };

                        let raw = match rt.block_on(client.generate_exam(&topics, None)) {
                            Ok(raw) => raw,
                            Err(e) => {
                                logger::log(&format!("Worker transport error: {}", e));
                                let _ = ai_tx.send(AiResponse::Failed {
                                    error: format!("Generation failed: {}", e),
                                });
                                continue;
                            }
                        };

                        match parse_questions(&raw) {
                            Ok(questions) if questions.is_empty() => {
                                let _ = ai_tx.send(AiResponse::Failed {
                                    error: "Generation returned an empty question set".to_string(),
                                });
                            }
                            Ok(questions) => {
                                logger::log(&format!(
                                    "Worker normalized {} questions",
                                    questions.len()
                                ));
                                let _ = ai_tx.send(AiResponse::Generated { questions });
                            }
                            Err(e) => {
                                logger::log(&format!("Worker normalization error: {}", e));
                                let _ = ai_tx.send(AiResponse::Failed {
                                    error: format!("Generation failed: {}", e),
                                });
                            }
                        }
                    }
                    Err(_) => {
                        // Channel disconnected, exit worker
                        logger::log("Worker channel disconnected, exiting");
                        break;
                    }
                }
            }
        })
        .expect("Failed to spawn AI worker thread")
}
