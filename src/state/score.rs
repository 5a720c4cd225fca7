use crate::state::SessionState;
use crate::types::ScoreEntry;

impl SessionState {
    /// Add points for a user, creating their entry on the first win. Entries
    /// keep their first-win position, which is what breaks scoreboard ties.
    pub async fn award_points(&self, name: &str, amount: u64) {
        let mut scores = self.scores.lock().await;
        match scores.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.total += amount,
            None => scores.push(ScoreEntry {
                name: name.to_string(),
                total: amount,
            }),
        }
        drop(scores);
        tracing::info!(user = %name, amount, "Points awarded");
    }

    /// Current total for a user, zero if they never scored.
    pub async fn balance(&self, name: &str) -> u64 {
        self.scores
            .lock()
            .await
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.total)
            .unwrap_or(0)
    }

    /// Top five totals. The sort is stable, so equal totals stay in
    /// first-win order.
    pub async fn leaderboard(&self) -> Vec<ScoreEntry> {
        let mut entries = self.scores.lock().await.clone();
        // Sort by total descending
        entries.sort_by(|a, b| b.total.cmp(&a.total));
        entries.truncate(5);
        entries
    }
}
