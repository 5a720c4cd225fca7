use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;
use triviad::audit::AuditLog;
use triviad::config::Config;
use triviad::protocol::ServerMessage;
use triviad::questions::QuestionBank;
use triviad::session::{self, dispatch};
use triviad::state::SessionState;
use triviad::types::ChatUser;

/// Four clean rows, no drops, so question ids are just row positions.
const SAMPLE_CSV: &str = "\
Show Number, Air Date, Round, Category, Value, Question, Answer
1,2015-01-05,Jeopardy!,SEA LIFE,$500,The largest animal ever known to have lived,the Blue Whale
2,2015-01-05,Jeopardy!,HISTORY,$100,First man to walk on the moon,Neil Armstrong
3,2015-01-06,Jeopardy!,HISTORY,$200,This wall fell in 1989,the Berlin Wall
4,2015-01-06,Jeopardy!,OPERA,$300,He composed The Magic Flute,Mozart
";

fn fast_config() -> Config {
    Config {
        round_duration: Duration::from_millis(150),
        question_cooldown: Duration::ZERO,
        ..Config::default()
    }
}

fn build_state(config: Config) -> (Arc<SessionState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::open(
        &dir.path().join("history.log"),
        &dir.path().join("submissions.log"),
    )
    .expect("audit logs should open");
    let bank =
        QuestionBank::from_reader(SAMPLE_CSV.as_bytes(), &config.bank_filter(), &config.points_name)
            .expect("sample csv should parse");
    (Arc::new(SessionState::new(config, bank, audit)), dir)
}

fn user(name: &str) -> ChatUser {
    ChatUser {
        id: ulid::Ulid::new(),
        name: name.to_string(),
    }
}

/// Next bot chat line from the broadcast, skipping non-chat frames.
async fn next_chat(rx: &mut broadcast::Receiver<ServerMessage>) -> String {
    loop {
        let msg = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a chat line")
            .expect("broadcast closed");
        if let ServerMessage::Chat { text, .. } = msg {
            return text;
        }
    }
}

fn expect_silence(rx: &mut broadcast::Receiver<ServerMessage>) {
    match rx.try_recv() {
        Err(broadcast::error::TryRecvError::Empty) => {}
        other => panic!("expected no pending messages, got {other:?}"),
    }
}

/// End-to-end round: request, announce, winning answer, payout, audit.
#[tokio::test]
async fn test_full_round_with_winner() {
    let mut config = fast_config();
    config.round_duration = Duration::from_secs(60);
    let (state, dir) = build_state(config);
    let mut rx = state.broadcast.subscribe();
    let (alice, bob) = (user("alice"), user("bob"));

    // 1. Alice requests a round; the task runs until the round resolves.
    let round_task = {
        let state = Arc::clone(&state);
        let alice = alice.clone();
        tokio::spawn(async move { dispatch(&state, &alice, "!trivia sea life 500").await })
    };

    // 2. Announcement: category line, then the question itself.
    assert_eq!(next_chat(&mut rx).await, "SEA LIFE for 500 points");
    assert_eq!(
        next_chat(&mut rx).await,
        "The largest animal ever known to have lived"
    );

    // 3. Bob answers correctly; the round resolves well before the deadline.
    dispatch(&state, &bob, "!whatis the blue whale").await;
    timeout(Duration::from_secs(5), round_task)
        .await
        .expect("round should resolve promptly")
        .unwrap();

    assert_eq!(next_chat(&mut rx).await, "Answer: the Blue Whale");
    assert_eq!(next_chat(&mut rx).await, "!addpoints bob 500");

    // 4. The win landed on Bob's ledger and in the session history.
    dispatch(&state, &bob, "!balance").await;
    assert_eq!(next_chat(&mut rx).await, "bob, you won 500 points this stream!");
    assert_eq!(state.asked_count().await, 1);

    // 5. Audit trail: one round record naming Bob, his attempt on file.
    let history = std::fs::read_to_string(dir.path().join("history.log")).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("\tbob\t500"));

    let submissions = std::fs::read_to_string(dir.path().join("submissions.log")).unwrap();
    assert!(submissions.contains("!whatis the blue whale"));

    println!("✅ Full winner round integration test passed!");
}

/// A round nobody answers runs out its clock and pays nobody.
#[tokio::test]
async fn test_round_without_winner() {
    let (state, dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    dispatch(&state, &alice, "!trivia opera 300").await;

    assert_eq!(next_chat(&mut rx).await, "OPERA for 300 points");
    assert_eq!(next_chat(&mut rx).await, "He composed The Magic Flute");
    assert_eq!(next_chat(&mut rx).await, "Answer: Mozart");
    assert_eq!(next_chat(&mut rx).await, "No one got it right D:");
    expect_silence(&mut rx);

    assert_eq!(state.balance("alice").await, 0);

    // Audit record carries the no-winner placeholders.
    let history = std::fs::read_to_string(dir.path().join("history.log")).unwrap();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\t0\tnull\t"));

    println!("✅ No-winner round integration test passed!");
}

/// A second request during an open round quotes the time still left.
#[tokio::test]
async fn test_request_during_open_round_reports_time_left() {
    let mut config = fast_config();
    config.round_duration = Duration::from_secs(60);
    let (state, _dir) = build_state(config);
    let mut rx = state.broadcast.subscribe();
    let (alice, bob) = (user("alice"), user("bob"));

    let round_task = {
        let state = Arc::clone(&state);
        let alice = alice.clone();
        tokio::spawn(async move { dispatch(&state, &alice, "!trivia sea life 500").await })
    };
    assert_eq!(next_chat(&mut rx).await, "SEA LIFE for 500 points");
    let _question = next_chat(&mut rx).await;

    // Bob asks for another question while Alice's is still open.
    dispatch(&state, &bob, "!trivia 100").await;
    let reply = next_chat(&mut rx).await;
    assert!(reply.starts_with("There's still "), "got: {reply}");
    assert!(reply.ends_with(" seconds left on the current question!"), "got: {reply}");

    // Close out the round so the spawned task finishes.
    dispatch(&state, &bob, "!whatis the blue whale").await;
    timeout(Duration::from_secs(5), round_task)
        .await
        .expect("round should resolve promptly")
        .unwrap();

    println!("✅ Open-round rejection integration test passed!");
}

/// Right after a round, the next request is on cooldown and says so.
#[tokio::test]
async fn test_cooldown_message_after_round() {
    let mut config = fast_config();
    config.question_cooldown = Duration::from_secs(60);
    let (state, _dir) = build_state(config);
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    dispatch(&state, &alice, "!trivia history 100").await;
    for _ in 0..4 {
        // category, question, answer, no-winner
        let _ = next_chat(&mut rx).await;
    }

    dispatch(&state, &alice, "!trivia history 200").await;
    let reply = next_chat(&mut rx).await;
    assert!(reply.starts_with("Next question available in "), "got: {reply}");
    assert!(reply.ends_with(" seconds."), "got: {reply}");
    assert_eq!(state.asked_count().await, 1);

    println!("✅ Cooldown message integration test passed!");
}

/// Off-grid point values are rejected with the configured bounds.
#[tokio::test]
async fn test_invalid_value_message() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    for request in ["!trivia 123", "!trivia 50", "!trivia 2100"] {
        dispatch(&state, &alice, request).await;
        assert_eq!(
            next_chat(&mut rx).await,
            "Please use a point value between 100 and 2000, in increments of 100"
        );
    }
    assert_eq!(state.asked_count().await, 0);

    println!("✅ Invalid value integration test passed!");
}

/// Unknown categories miss; a category whose only question was asked is spent.
#[tokio::test]
async fn test_no_match_and_exhausted_pool_messages() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    dispatch(&state, &alice, "!trivia geography").await;
    assert_eq!(next_chat(&mut rx).await, "Hmmm... couldn't find a question for that.");

    // Burn the only OPERA question.
    dispatch(&state, &alice, "!trivia opera").await;
    for _ in 0..4 {
        let _ = next_chat(&mut rx).await;
    }

    dispatch(&state, &alice, "!trivia opera").await;
    assert_eq!(next_chat(&mut rx).await, "Hmmm... seems all those questions were asked.");

    println!("✅ No-match and exhaustion integration test passed!");
}

/// Scoreboard stays silent while empty, then shows the top five with ties in
/// first-win order.
#[tokio::test]
async fn test_scoreboard_formatting() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    dispatch(&state, &alice, "!scoreboard").await;
    expect_silence(&mut rx);

    for (name, amount) in [("a", 100), ("b", 300), ("c", 300), ("d", 700), ("e", 200), ("f", 50)] {
        state.award_points(name, amount).await;
    }

    dispatch(&state, &alice, "!scoreboard").await;
    assert_eq!(
        next_chat(&mut rx).await,
        "d: $700 | b: $300 | c: $300 | e: $200 | a: $100"
    );

    println!("✅ Scoreboard integration test passed!");
}

/// Balance answers for known and unknown users alike.
#[tokio::test]
async fn test_balance_messages() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();

    state.award_points("alice", 700).await;

    dispatch(&state, &user("alice"), "!balance").await;
    assert_eq!(next_chat(&mut rx).await, "alice, you won 700 points this stream!");

    dispatch(&state, &user("newcomer"), "!balance").await;
    assert_eq!(next_chat(&mut rx).await, "newcomer, you won 0 points this stream!");

    println!("✅ Balance integration test passed!");
}

/// Help is a fixed line; categories come from the loaded pool.
#[tokio::test]
async fn test_help_and_categories() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    dispatch(&state, &alice, "!trivia help").await;
    assert_eq!(next_chat(&mut rx).await, session::help_text());

    // The sample asks for more rows than exist, so every category shows up.
    dispatch(&state, &alice, "!trivia categories").await;
    let reply = next_chat(&mut rx).await;
    let mut categories: Vec<&str> = reply.split(" | ").collect();
    categories.sort_unstable();
    assert_eq!(categories, vec!["HISTORY", "OPERA", "SEA LIFE"]);

    println!("✅ Help and categories integration test passed!");
}

/// Daily and hourly awards pay once per window and stay quiet when denied.
#[tokio::test]
async fn test_daily_and_hourly_awards() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let (alice, bob) = (user("alice"), user("bob"));

    dispatch(&state, &alice, "!daily").await;
    assert_eq!(next_chat(&mut rx).await, "!addpoints alice 1000");
    dispatch(&state, &alice, "!daily").await;
    expect_silence(&mut rx);

    dispatch(&state, &alice, "!hourly").await;
    assert_eq!(next_chat(&mut rx).await, "!addpoints alice 100");
    dispatch(&state, &alice, "!hourly").await;
    expect_silence(&mut rx);

    // Windows are per user, so Bob's first claim still pays.
    dispatch(&state, &bob, "!daily").await;
    assert_eq!(next_chat(&mut rx).await, "!addpoints bob 1000");

    println!("✅ Daily and hourly award integration test passed!");
}

/// Answers with no question open, and commands nobody knows.
#[tokio::test]
async fn test_stray_input_handling() {
    let (state, _dir) = build_state(fast_config());
    let mut rx = state.broadcast.subscribe();
    let alice = user("alice");

    dispatch(&state, &alice, "!whatis the blue whale").await;
    assert_eq!(
        next_chat(&mut rx).await,
        "alice, there's no active question, see (!trivia help)"
    );

    dispatch(&state, &alice, "!frobnicate now").await;
    expect_silence(&mut rx);

    // Plain chat is not a command at all.
    dispatch(&state, &alice, "good morning everyone").await;
    expect_silence(&mut rx);

    println!("✅ Stray input integration test passed!");
}
