//! 테스트용 tracing 이벤트 기록기

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// 기록된 이벤트 (레벨, target, 메시지)
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub level: Level,
    pub target: String,
    pub message: String,
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.0.lock().push(Recorded {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.0,
        });
    }
}

/// `run` 동안 현재 스레드에서 발생한 이벤트를 모아 반환
pub(crate) fn capture<F: FnOnce()>(run: F) -> Vec<Recorded> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(Recorder(Arc::clone(&events)));
    tracing::subscriber::with_default(subscriber, run);
    let recorded = events.lock().clone();
    recorded
}

/// 특정 target 의 WARN 이벤트만
pub(crate) fn warnings(events: &[Recorded], target: &str) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.level == Level::WARN && e.target == target)
        .map(|e| e.message.clone())
        .collect()
}
