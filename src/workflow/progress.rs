//! Cosmetic status script shown while a document is being generated.
//!
//! The messages are not tied to backend progress. When enabled, the script
//! plays alongside the real call and both must finish before the result is
//! looked at.

use std::future::Future;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Duration;

pub const PENDING_MESSAGE: &str = "Generating your document...";

pub const SCRIPT: [(&str, Duration); 5] = [
    ("Analyzing your resume...", Duration::from_millis(2000)),
    ("Understanding job requirements...", Duration::from_millis(2000)),
    ("Matching skills and experience...", Duration::from_millis(2000)),
    ("Crafting personalized content...", Duration::from_millis(2000)),
    ("Finalizing your document...", Duration::from_millis(1000)),
];

/// Emit each scripted message, then wait out its delay.
pub async fn play(tx: &UnboundedSender<String>) {
    for (message, delay) in SCRIPT {
        let _ = tx.send(message.to_string());
        tokio::time::sleep(delay).await;
    }
}

/// Drive `call` to completion, with the script running concurrently when `tx` is given.
/// Without a script a single pending status is sent.
pub async fn with_script<F>(call: F, tx: Option<&UnboundedSender<String>>, scripted: bool) -> F::Output
where
    F: Future,
{
    match tx {
        Some(tx) if scripted => {
            let (out, ()) = tokio::join!(call, play(tx));
            out
        }
        Some(tx) => {
            let _ = tx.send(PENDING_MESSAGE.to_string());
            call.await
        }
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn script_outlasts_a_fast_call() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let started = tokio::time::Instant::now();

        let out = with_script(async { 7 }, Some(&tx), true).await;

        assert_eq!(out, 7);
        assert_eq!(started.elapsed(), Duration::from_millis(9000));
        let mut seen = Vec::new();
        while let Ok(m) = rx.try_recv() {
            seen.push(m);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], "Analyzing your resume...");
        assert_eq!(seen[4], "Finalizing your document...");
    }

    #[tokio::test(start_paused = true)]
    async fn unscripted_run_sends_one_pending_status() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let started = tokio::time::Instant::now();

        with_script(async {}, Some(&tx), false).await;

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(rx.try_recv().unwrap(), PENDING_MESSAGE);
        assert!(rx.try_recv().is_err());
    }
}
