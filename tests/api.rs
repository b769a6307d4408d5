//! End-to-end tests for the HTTP API, driven through the router with a manual
//! clock so countdowns are deterministic.

use std::{
    fmt,
    sync::{Arc, Mutex, Weak},
};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use task_timer::{
    create_router,
    state::{AppState, CompletionRecord, TaskQueue, TimerState},
    tasks::{poll_once, TickOutcome},
    utils::{Clock, ManualClock},
};

type Hook = Box<dyn FnOnce() + Send>;

/// Manual clock that can run a callback the next time it is read, to land a
/// change between a handler's check and its transition
struct HookClock {
    time: ManualClock,
    hook: Mutex<Option<Hook>>,
}

impl HookClock {
    fn set(&self, now: i64) {
        self.time.set(now);
    }

    fn advance(&self, seconds: i64) {
        self.time.advance(seconds);
    }

    fn on_next_read(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }
}

impl fmt::Debug for HookClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookClock").field("time", &self.time).finish()
    }
}

impl Clock for HookClock {
    fn now(&self) -> i64 {
        let hook = self.hook.lock().unwrap().take();
        if let Some(hook) = hook {
            hook();
        }
        self.time.now()
    }
}

struct Harness {
    clock: Arc<HookClock>,
    state: Arc<AppState>,
    router: Router,
}

impl Harness {
    fn new(tasks: &[&str]) -> Self {
        let clock = Arc::new(HookClock {
            time: ManualClock::new(1000),
            hook: Mutex::new(None),
        });
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Box::new(TaskQueue::from_iter(tasks.iter().copied())),
        ));
        let router = create_router(Arc::clone(&state));
        Self { clock, state, router }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn timer(&self) -> TimerState {
        self.state.get_timer_state().unwrap()
    }

    fn weak_state(&self) -> Weak<AppState> {
        Arc::downgrade(&self.state)
    }
}

#[tokio::test]
async fn test_health() {
    let h = Harness::new(&[]);
    let (status, body) = h.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_initial_timer_is_idle() {
    let h = Harness::new(&["write"]);
    let (status, body) = h.send("GET", "/timer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duration"], 0);
    assert_eq!(body["paused"], true);
    assert_eq!(body["started"], false);
    assert_eq!(body["start_time"], Value::Null);
    assert_eq!(body["phase"], "idle");
    assert_eq!(body["theme"], "default");
    assert_eq!(body["active_task"], "write");
}

#[tokio::test]
async fn test_duration_fields_are_coerced() {
    let h = Harness::new(&["write"]);

    let (status, body) = h
        .send("PUT", "/timer/duration", Some(json!({ "minutes": "1", "seconds": 30 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["duration"], 90);
    assert_eq!(body["timer"]["remaining"], json!({ "hours": 0, "minutes": 1, "seconds": 30 }));

    // hours edit keeps minutes and drops seconds
    let (_, body) = h.send("PUT", "/timer/duration", Some(json!({ "hours": 2 }))).await;
    assert_eq!(body["timer"]["duration"], 2 * 3600 + 60);

    // garbage becomes zero
    let (_, body) = h
        .send("PUT", "/timer/duration", Some(json!({ "hours": "lots", "minutes": -4 })))
        .await;
    assert_eq!(body["timer"]["duration"], 0);
}

#[tokio::test]
async fn test_start_requires_duration() {
    let h = Harness::new(&["write"]);
    let (status, body) = h.send("POST", "/timer/start", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert!(h.timer().paused);
}

#[tokio::test]
async fn test_countdown_to_automatic_pause() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;

    let (status, body) = h.send("POST", "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["timer"]["start_time"], 1000);

    h.clock.set(1030);
    let (_, body) = h.send("GET", "/timer", None).await;
    assert_eq!(body["time_remaining"], 30);
    assert_eq!(body["display"], "30s");
    assert_eq!(body["theme"], "accent");
    assert_eq!(poll_once(&h.state).unwrap(), TickOutcome::Running { remaining: 30 });

    h.clock.set(1065);
    assert_eq!(poll_once(&h.state).unwrap(), TickOutcome::Expired);
    let (_, body) = h.send("GET", "/timer", None).await;
    assert_eq!(body["paused"], true);
    assert_eq!(body["duration"], 0);
    assert_eq!(body["phase"], "idle");
}

#[tokio::test]
async fn test_expiry_does_not_pause_a_restarted_countdown() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;
    h.send("POST", "/timer/start", None).await;

    // the old countdown has run out when the tick reads it, but a new one is
    // started before the tick acts on it
    h.clock.set(1065);
    let state = h.weak_state();
    h.clock.on_next_read(move || {
        let state = state.upgrade().unwrap();
        state.stop().unwrap();
        state.set_duration(60).unwrap();
        state.start().unwrap();
    });

    assert_eq!(poll_once(&h.state).unwrap(), TickOutcome::Inactive);
    let timer = h.timer();
    assert!(timer.is_running());
    assert_eq!(timer.start_time, Some(1065));
    assert_eq!(timer.duration, 60);

    h.clock.set(1125);
    assert_eq!(poll_once(&h.state).unwrap(), TickOutcome::Expired);
}

#[tokio::test]
async fn test_pause_and_resume_keep_remaining_time() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 10 }))).await;
    h.send("POST", "/timer/start", None).await;

    h.clock.set(1100);
    let (status, body) = h.send("POST", "/timer/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["duration"], 500);
    assert_eq!(body["timer"]["phase"], "ready");

    h.clock.set(5000);
    let (status, body) = h.send("POST", "/timer/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["start_time"], 5000);
    assert_eq!(body["timer"]["time_remaining"], 500);

    // resuming again is rejected and keeps the running start time
    h.clock.set(5010);
    let (status, _) = h.send("POST", "/timer/resume", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(h.timer().start_time, Some(5000));
}

#[tokio::test]
async fn test_pause_requires_active_task() {
    let h = Harness::new(&[]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;
    h.send("POST", "/timer/start", None).await;

    let (status, _) = h.send("POST", "/timer/pause", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(h.timer().is_running());
}

#[tokio::test]
async fn test_toggle_starts_then_pauses() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;

    let (_, body) = h.send("POST", "/timer/toggle", None).await;
    assert_eq!(body["status"], "running");

    h.clock.advance(20);
    let (_, body) = h.send("POST", "/timer/toggle", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["timer"]["duration"], 40);
}

#[tokio::test]
async fn test_duration_locked_while_running() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;
    h.send("POST", "/timer/start", None).await;

    let (status, _) = h.send("PUT", "/timer/duration", Some(json!({ "minutes": 5 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(h.timer().duration, 60);
}

#[tokio::test]
async fn test_duration_rejected_when_start_lands_first() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;

    let state = h.weak_state();
    h.clock.on_next_read(move || {
        state.upgrade().unwrap().start().unwrap();
    });

    let (status, body) = h.send("PUT", "/timer/duration", Some(json!({ "minutes": 5 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert_eq!(h.timer().duration, 60);
    assert!(h.timer().is_running());
}

#[tokio::test]
async fn test_stop_resets_timer() {
    let h = Harness::new(&["write"]);
    let (status, _) = h.send("POST", "/timer/stop", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;
    h.send("POST", "/timer/start", None).await;
    let (status, body) = h.send("POST", "/timer/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(h.timer(), TimerState::new());
}

#[tokio::test]
async fn test_skip_advances_task_without_touching_timer() {
    let h = Harness::new(&["write", "review"]);
    h.send("PUT", "/timer/duration", Some(json!({ "minutes": 1 }))).await;
    h.send("POST", "/timer/start", None).await;

    let (status, body) = h.send("POST", "/tasks/skip", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_task"], "review");
    assert!(h.timer().is_running());

    h.send("POST", "/tasks/skip", None).await;
    let (status, _) = h.send("POST", "/tasks/skip", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_skip_requires_started_timer() {
    let h = Harness::new(&["write", "review"]);
    let (status, _) = h.send("POST", "/tasks/skip", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = h.send("GET", "/tasks", None).await;
    assert_eq!(body["active_task"], "write");
}

#[tokio::test]
async fn test_add_task() {
    let h = Harness::new(&[]);
    let (status, body) = h.send("POST", "/tasks", Some(json!({ "name": " plan " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["active_task"], "plan");

    let (status, _) = h.send("POST", "/tasks", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = h.send("GET", "/tasks", None).await;
    assert_eq!(body["tasks"], json!(["plan"]));
}

#[tokio::test]
async fn test_completion_crud() {
    let h = Harness::new(&[]);

    let (status, body) = h
        .send("POST", "/completions", Some(json!({ "date": "2024-03-05", "duration_minutes": 25 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_u64().unwrap();
    assert_eq!(body["time"], 1_709_596_800_i64);
    assert_eq!(body["duration"], 1500);

    let (status, body) = h
        .send(
            "PUT",
            &format!("/completions/{}", id),
            Some(json!({ "date": "2024-03-06", "duration_minutes": "30" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2024-03-06");
    assert_eq!(body["duration_minutes"], 30);

    // same day, new duration: the stored time is kept
    let (status, body) = h
        .send(
            "PUT",
            &format!("/completions/{}", id),
            Some(json!({ "date": "2024-03-06", "duration_minutes": 45 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time"], 1_709_683_200_i64);
    assert_eq!(body["duration"], 2700);

    let (status, _) = h
        .send("PUT", "/completions/999", Some(json!({ "date": "2024-03-06" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = h.send("GET", "/completions", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = h.send("DELETE", &format!("/completions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = h.send("DELETE", &format!("/completions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_completion_edit_on_same_day_keeps_time() {
    let h = Harness::new(&[]);
    // 2024-03-05 14:30 UTC
    let id = h
        .state
        .add_completion(CompletionRecord::new(1_709_649_000, 1500))
        .unwrap();

    let (status, body) = h
        .send(
            "PUT",
            &format!("/completions/{}", id),
            Some(json!({ "date": "2024-03-05", "duration_minutes": 30 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time"], 1_709_649_000_i64);
    assert_eq!(body["duration"], 1800);

    let (_, body) = h
        .send(
            "PUT",
            &format!("/completions/{}", id),
            Some(json!({ "date": "2024-03-06", "duration_minutes": 30 })),
        )
        .await;
    assert_eq!(body["time"], 1_709_683_200_i64);
}

#[tokio::test]
async fn test_completion_bad_date() {
    let h = Harness::new(&[]);
    let (status, body) = h
        .send("POST", "/completions", Some(json!({ "date": "someday", "duration_minutes": 5 })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_status_reports_last_action() {
    let h = Harness::new(&["write"]);
    h.send("PUT", "/timer/duration", Some(json!({ "seconds": 45 }))).await;
    let (status, body) = h.send("GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_action"], "set-duration");
    assert_eq!(body["timer"]["duration"], 45);
    assert_eq!(body["tasks"], json!(["write"]));
    assert_eq!(body["completions"], 0);
}
