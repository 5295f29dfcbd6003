//! Once Slots - 키별 "최대 한 번 실행" 보장
//!
//! 네임스페이스 로드와 모듈 import 가 공유하는 동기화 도구.
//! - 같은 키를 여러 스레드가 동시에 요청하면 첫 스레드만 실행하고 나머지는 대기
//! - 실행 중인 스레드가 같은 키를 다시 요청하면 (재진입) 즉시 반환
//! - 실패는 설정에 따라 캐시되거나 (재시도 없음) 다음 호출에서 재시도

use optreg_foundation::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// 이번 호출에서 실행됨
    Ran,

    /// 이미 완료되어 있었음
    AlreadyDone,

    /// 같은 스레드에서 실행 중 (재진입)
    Reentrant,
}

#[derive(Debug)]
enum SlotState {
    Pending,
    Running(ThreadId),
    Done,
    Failed(Arc<Error>),
}

#[derive(Debug)]
struct Slot {
    state: Mutex<SlotState>,
    finished: Condvar,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending),
            finished: Condvar::new(),
        }
    }
}

/// 실행 도중 패닉이 나도 대기 중인 스레드가 영원히 멈추지 않게 한다
///
/// 패닉도 실패로 취급한다: 캐시하는 슬롯은 `Failed`, 재시도 슬롯은 `Pending`.
struct RunGuard<'a> {
    slot: &'a Slot,
    cache_failures: bool,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.slot.state.lock() = if self.cache_failures {
                SlotState::Failed(Arc::new(Error::Internal("loader panicked".into())))
            } else {
                SlotState::Pending
            };
            self.slot.finished.notify_all();
        }
    }
}

/// 키별 한 번 실행 슬롯 모음
#[derive(Debug)]
pub struct OnceSlots {
    slots: Mutex<HashMap<String, Arc<Slot>>>,
    cache_failures: bool,
}

impl OnceSlots {
    /// 실패를 영구적으로 캐시하는 슬롯 (네임스페이스 로드용)
    pub fn caching_failures() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            cache_failures: true,
        }
    }

    /// 실패 시 다음 호출에서 재시도하는 슬롯 (모듈 import 용)
    pub fn retrying_failures() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            cache_failures: false,
        }
    }

    fn slot(&self, key: &str) -> Arc<Slot> {
        let mut slots = self.slots.lock();
        Arc::clone(
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Slot::new())),
        )
    }

    /// 키에 대해 `run` 을 최대 한 번 실행
    ///
    /// 실패하면 원인 에러를 Arc 로 반환한다. 실패를 캐시하는 경우 이후
    /// 호출은 모두 같은 Arc 를 받는다.
    pub fn run<F>(&self, key: &str, run: F) -> std::result::Result<SlotOutcome, Arc<Error>>
    where
        F: FnOnce() -> Result<()>,
    {
        let slot = self.slot(key);
        let me = thread::current().id();

        {
            let mut state = slot.state.lock();
            loop {
                match &*state {
                    SlotState::Done => return Ok(SlotOutcome::AlreadyDone),
                    SlotState::Failed(err) => return Err(Arc::clone(err)),
                    SlotState::Running(owner) if *owner == me => {
                        return Ok(SlotOutcome::Reentrant)
                    }
                    SlotState::Running(_) => {}
                    SlotState::Pending => break,
                }
                slot.finished.wait(&mut state);
            }
            *state = SlotState::Running(me);
        }

        let mut guard = RunGuard {
            slot: &slot,
            cache_failures: self.cache_failures,
            armed: true,
        };
        let result = run();
        guard.armed = false;

        let mut state = slot.state.lock();
        let outcome = match result {
            Ok(()) => {
                *state = SlotState::Done;
                Ok(SlotOutcome::Ran)
            }
            Err(err) => {
                let err = Arc::new(err);
                *state = if self.cache_failures {
                    SlotState::Failed(Arc::clone(&err))
                } else {
                    SlotState::Pending
                };
                Err(err)
            }
        };
        drop(state);
        slot.finished.notify_all();
        outcome
    }

    /// 완료 여부 (성공)
    pub fn is_done(&self, key: &str) -> bool {
        let slots = self.slots.lock();
        slots
            .get(key)
            .map(|slot| matches!(*slot.state.lock(), SlotState::Done))
            .unwrap_or(false)
    }

    /// 처리된 (성공 또는 캐시된 실패) 키 목록
    pub fn settled_keys(&self) -> Vec<String> {
        let slots = self.slots.lock();
        let mut keys: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| {
                matches!(*slot.state.lock(), SlotState::Done | SlotState::Failed(_))
            })
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// 모든 슬롯 초기화 (진행 중인 실행은 고아 슬롯에 결과를 쓴다)
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_once() {
        let slots = OnceSlots::caching_failures();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            slots
                .run("acc", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(slots.is_done("acc"));
    }

    #[test]
    fn test_cached_failure_is_shared() {
        let slots = OnceSlots::caching_failures();

        let first = slots.run("acc", || Err(Error::Internal("boom".into()))).unwrap_err();
        let second = slots.run("acc", || Ok(())).unwrap_err();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(slots.settled_keys(), vec!["acc".to_string()]);
    }

    #[test]
    fn test_retrying_failure() {
        let slots = OnceSlots::retrying_failures();

        assert!(slots.run("mod", || Err(Error::Internal("boom".into()))).is_err());
        assert_eq!(slots.run("mod", || Ok(())).unwrap(), SlotOutcome::Ran);
        assert_eq!(slots.run("mod", || Ok(())).unwrap(), SlotOutcome::AlreadyDone);
    }

    #[test]
    fn test_panic_is_retried_or_cached() {
        let retrying = OnceSlots::retrying_failures();
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = retrying.run("flaky", || panic!("import blew up"));
        }));
        assert!(panicked.is_err());
        assert_eq!(retrying.run("flaky", || Ok(())).unwrap(), SlotOutcome::Ran);

        let caching = OnceSlots::caching_failures();
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = caching.run("acc", || panic!("loader blew up"));
        }));
        assert!(panicked.is_err());
        let err = caching.run("acc", || Ok(())).unwrap_err();
        assert!(matches!(&*err, Error::Internal(_)));
    }

    #[test]
    fn test_reentrant_call_returns_immediately() {
        let slots = OnceSlots::caching_failures();
        let calls = AtomicUsize::new(0);

        slots
            .run("acc", || {
                calls.fetch_add(1, Ordering::SeqCst);
                let inner = slots.run("acc", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                assert_eq!(inner.unwrap(), SlotOutcome::Reentrant);
                Ok(())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_callers_wait() {
        let slots = OnceSlots::caching_failures();
        let calls = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    slots
                        .run("acc", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            Ok(())
                        })
                        .unwrap();
                    assert!(slots.is_done("acc"));
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_allows_rerun() {
        let slots = OnceSlots::caching_failures();
        slots.run("acc", || Ok(())).unwrap();
        slots.clear();

        assert!(!slots.is_done("acc"));
        assert_eq!(slots.run("acc", || Ok(())).unwrap(), SlotOutcome::Ran);
    }
}
