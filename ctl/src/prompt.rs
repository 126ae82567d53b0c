use certdir_client::directory::Confirm;
use tracing::warn;

/// Asks on the terminal. Anything but an explicit yes declines.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or_else(|err| {
                warn!(error = %err, "could not read confirmation");
                false
            })
    }
}
