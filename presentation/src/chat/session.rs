//! Running one prompt to completion with Ctrl-C as the stop control

use streamchat_application::{GenerationController, GenerationReport, SubmitError};
use streamchat_domain::EngineSelection;
use tracing::debug;

/// Submit `prompt` and wait for the session to finish.
///
/// Ctrl-C while the reply is pending or streaming cancels the generation;
/// the partial reply stays on screen.
pub async fn run_prompt(
    controller: &GenerationController,
    prompt: &str,
    engine: EngineSelection,
) -> Result<GenerationReport, SubmitError> {
    let handle = controller.submit(prompt, engine)?;
    let wait = handle.wait();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            report = &mut wait => return Ok(report),
            signal = tokio::signal::ctrl_c() => {
                if signal.is_err() {
                    // No signal handler available; just wait for the reply.
                    return Ok(wait.await);
                }
                debug!("Ctrl-C received; cancelled: {}", controller.cancel());
            }
        }
    }
}
