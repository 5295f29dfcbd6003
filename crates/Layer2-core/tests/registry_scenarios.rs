//! 레지스트리 통합 시나리오
//!
//! 등록 -> 네임스페이스 지연 로드 -> 버전 해석 -> 생성 -> 래퍼 적용 전체 흐름

use optreg_core::problem::{OrderEnforcing, PassiveChecker, RenderCollection, TimeLimit};
use optreg_core::{
    factory, wrapper, Error, Kwargs, MakeOptions, ManifestEntry, ManifestLoader, Metadata,
    PluginManifest, Problem, ProblemFactory, Registration, Registry, RegistryConfig, Step,
    StaticModule, WrapperFactory, WrapperSpec,
};
use optreg_foundation::JsonStore;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// ============================================================================
// Test doubles
// ============================================================================

struct Steer {
    metadata: Metadata,
    render_mode: Option<String>,
    x: i64,
    t: u32,
}

impl Problem for Steer {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn render_mode(&self) -> Option<&str> {
        self.render_mode.as_deref()
    }

    fn reset(&mut self, _seed: Option<u64>) -> optreg_core::Result<Value> {
        self.t = 0;
        Ok(json!(0))
    }

    fn step(&mut self, _action: &Value) -> optreg_core::Result<Step> {
        self.t += 1;
        Ok(Step::new(json!(self.t), 1.0))
    }

    fn render(&mut self) -> optreg_core::Result<Option<Value>> {
        Ok(self.render_mode.as_ref().map(|_| json!({ "frame": self.t })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn steer_metadata() -> Metadata {
    Metadata::new().with_render_modes(["ansi", "rgb_array"])
}

fn steer_factory() -> Arc<dyn ProblemFactory> {
    factory(steer_metadata(), |render_mode, kwargs| {
        Ok(Box::new(Steer {
            metadata: steer_metadata(),
            render_mode: render_mode.map(String::from),
            x: kwargs.get("x").and_then(Value::as_i64).unwrap_or(0),
            t: 0,
        }) as Box<dyn Problem>)
    })
}

/// 생성 시 라벨을 새기는 래퍼
struct Marker {
    inner: Box<dyn Problem>,
    label: String,
}

impl Problem for Marker {
    fn metadata(&self) -> &Metadata {
        self.inner.metadata()
    }

    fn inner(&self) -> Option<&(dyn Problem + 'static)> {
        Some(self.inner.as_ref())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn marker() -> Arc<dyn WrapperFactory> {
    wrapper(|inner, kwargs: &Kwargs| {
        let label = kwargs
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Box::new(Marker { inner, label }) as Box<dyn Problem>)
    })
}

/// import 횟수를 세는 플러그인 모듈
fn acc_plugin(imports: Arc<AtomicUsize>) -> StaticModule {
    StaticModule::new("acc_problems")
        .with_factory("Steer", steer_factory())
        .on_import(move |registrar| {
            imports.fetch_add(1, Ordering::SeqCst);
            registrar.register(
                Registration::new("Steer-v1", "acc_problems:Steer").with_kwarg("x", 1),
            )
        })
}

fn acc_registry(imports: &Arc<AtomicUsize>) -> Registry {
    let manifest = PluginManifest::new().with_entry("acc", ManifestEntry::new("acc_problems"));
    let registry = Registry::with_loader(ManifestLoader::new(manifest));
    registry.modules().add(Arc::new(acc_plugin(Arc::clone(imports))));
    registry
}

fn bare() -> MakeOptions {
    MakeOptions::new()
        .with_disable_env_checker(true)
        .with_order_enforce(false)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_steer_override_and_latest_version() {
    let registry = Registry::new();
    registry
        .register(Registration::new("acc/Steer-v1", steer_factory()).with_kwarg("x", 1))
        .unwrap();

    let problem = registry
        .make("acc/Steer-v1", MakeOptions::new().with_kwarg("x", 2))
        .unwrap();
    let steer = problem.unwrapped().downcast_ref::<Steer>().unwrap();
    assert_eq!(steer.x, 2);
    assert_eq!(problem.spec().kwargs["x"], 2);

    let problem = registry.make("acc/Steer", MakeOptions::new()).unwrap();
    assert_eq!(problem.spec().id.to_string(), "acc/Steer-v1");
    assert_eq!(problem.id(), "acc/Steer-v1");
    assert_eq!(problem.unwrapped().downcast_ref::<Steer>().unwrap().x, 1);

    // 저장된 명세는 make() 인자에 영향받지 않는다
    assert_eq!(registry.spec("acc/Steer-v1").unwrap().kwargs["x"], 1);
}

#[test]
fn test_unknown_namespace_never_imports() {
    let imports = Arc::new(AtomicUsize::new(0));
    let registry = acc_registry(&imports);

    let err = registry.make("unknown/Thing-v1", MakeOptions::new()).unwrap_err();
    assert!(matches!(err, Error::UnregisteredId { .. }));
    assert_eq!(imports.load(Ordering::SeqCst), 0);
    assert!(!registry.modules().is_imported("acc_problems"));
    assert_eq!(registry.loaded_namespaces(), vec!["unknown".to_string()]);
}

#[test]
fn test_namespace_loads_once_over_many_makes() {
    let imports = Arc::new(AtomicUsize::new(0));
    let registry = acc_registry(&imports);

    for _ in 0..100 {
        let problem = registry.make("acc/Steer", MakeOptions::new()).unwrap();
        assert_eq!(problem.id(), "acc/Steer-v1");
    }

    assert_eq!(imports.load(Ordering::SeqCst), 1);
}

#[test]
fn test_namespace_loads_once_under_concurrency() {
    let imports = Arc::new(AtomicUsize::new(0));
    let registry = acc_registry(&imports);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                let problem = registry.make("acc/Steer-v1", MakeOptions::new()).unwrap();
                assert_eq!(problem.unwrapped().downcast_ref::<Steer>().unwrap().x, 1);
            });
        }
    });

    assert_eq!(imports.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_load_is_cached_and_reraised() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let manifest = PluginManifest::new()
        .with_entry("acc", ManifestEntry::new("acc_broken").with_function("register_all"));
    let registry = Registry::with_loader(ManifestLoader::new(manifest));
    registry.modules().add(Arc::new(StaticModule::new("acc_broken").with_loader(
        "register_all",
        move |_registrar| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("plugin exploded").into())
        },
    )));

    let first = registry.make("acc/Steer-v1", MakeOptions::new()).unwrap_err();
    let second = registry.make("acc/Steer-v1", MakeOptions::new()).unwrap_err();

    match (&first, &second) {
        (Error::PluginLoad { source: a, .. }, Error::PluginLoad { source: b, .. }) => {
            assert!(Arc::ptr_eq(a, b));
            assert_eq!(a.to_string(), "plugin exploded");
        }
        other => panic!("unexpected errors: {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_plugin_namespace_mismatch_fails_load() {
    let manifest = PluginManifest::new().with_entry("acc", ManifestEntry::new("acc_problems"));
    let registry = Registry::with_loader(ManifestLoader::new(manifest));
    registry.modules().add(Arc::new(StaticModule::new("acc_problems").on_import(
        |registrar| registrar.register(Registration::new("toy/Steer-v1", steer_factory())),
    )));

    let err = registry.spec("acc/Steer").unwrap_err();
    assert!(matches!(err.load_cause(), Some(Error::NamespaceMismatch { .. })));
    assert!(registry.spec("toy/Steer-v1").is_err());
}

#[test]
fn test_plugin_registering_through_registry_is_scoped() {
    let manifest = PluginManifest::new().with_entry("acc", ManifestEntry::new("acc_problems"));
    let registry = Registry::with_loader(ManifestLoader::new(manifest));
    registry.modules().add(Arc::new(
        StaticModule::new("acc_problems")
            .with_factory("Steer", steer_factory())
            .on_import(|registrar| {
                let registry = registrar.registry();
                registry.register(Registration::new("Steer-v1", "acc_problems:Steer"))?;
                registry.register(Registration::new("toy/Other-v1", "acc_problems:Steer"))
            }),
    ));

    let err = registry.spec("acc/Steer").unwrap_err();
    assert!(matches!(err.load_cause(), Some(Error::NamespaceMismatch { .. })));
    assert!(registry.spec("toy/Other-v1").is_err());
    assert_eq!(
        registry.ids().iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["acc/Steer-v1"]
    );
}

#[test]
fn test_wrapper_ordering() {
    let registry = Registry::new();
    registry
        .register(
            Registration::new("acc/Steer-v1", steer_factory())
                .with_wrapper(WrapperSpec::new("A", marker()).with_kwarg("label", "A"))
                .with_wrapper(WrapperSpec::new("B", marker()).with_kwarg("label", "B")),
        )
        .unwrap();

    let problem = registry.make("acc/Steer-v1", bare()).unwrap();
    let outer = problem.downcast_ref::<Marker>().unwrap();
    assert_eq!(outer.label, "B");
    let inner = outer.inner.downcast_ref::<Marker>().unwrap();
    assert_eq!(inner.label, "A");
    assert!(inner.inner.downcast_ref::<Steer>().is_some());

    let plain = registry.make("acc/Steer-v1", bare().without_wrappers()).unwrap();
    assert!(plain.downcast_ref::<Steer>().is_some());
}

#[test]
fn test_builtin_wrapper_stack() {
    let registry = Registry::new();
    registry
        .register(
            Registration::new("acc/Steer-v1", steer_factory())
                .with_max_episode_steps(5)
                .with_wrapper(WrapperSpec::new("A", marker())),
        )
        .unwrap();

    let problem = registry.make("acc/Steer-v1", MakeOptions::new()).unwrap();
    let stack = problem.wrapper_stack();
    assert_eq!(stack.len(), 5);
    assert!(stack[0].ends_with("Marker"));
    assert!(problem.find::<TimeLimit>().is_some());
    assert!(problem.find::<OrderEnforcing>().is_some());
    assert!(problem.find::<PassiveChecker>().is_some());
    assert!(stack[4].ends_with("Steer"));
}

#[test]
fn test_order_enforcing_and_time_limit() {
    let registry = Registry::new();
    registry
        .register(Registration::new("acc/Steer-v1", steer_factory()).with_max_episode_steps(5))
        .unwrap();

    let mut problem = registry
        .make("acc/Steer-v1", MakeOptions::new().with_max_episode_steps(2))
        .unwrap();
    assert_eq!(problem.spec().max_episode_steps, Some(2));

    assert!(matches!(problem.step(&json!(0)), Err(Error::OrderViolation(_))));

    problem.reset(None).unwrap();
    assert!(!problem.step(&json!(0)).unwrap().truncated);
    assert!(problem.step(&json!(0)).unwrap().truncated);
}

#[test]
fn test_autoreset_option() {
    let registry = Registry::new();
    registry
        .register(Registration::new("acc/Steer-v1", steer_factory()).with_max_episode_steps(1))
        .unwrap();

    let mut problem = registry
        .make("acc/Steer-v1", MakeOptions::new().with_autoreset(true))
        .unwrap();
    problem.reset(None).unwrap();

    let step = problem.step(&json!(0)).unwrap();
    assert!(step.truncated);
    assert_eq!(step.info["final_observation"], json!(1));
    assert_eq!(step.observation, json!(0));
}

#[test]
fn test_numeric_version_selection() {
    let registry = Registry::new();
    for raw in ["ns/foo-v1", "ns/foo-v2", "ns/foo-v10"] {
        registry.register(Registration::new(raw, steer_factory())).unwrap();
    }

    assert_eq!(registry.resolve("ns/foo").unwrap().to_string(), "ns/foo-v10");
    assert_eq!(registry.make("ns/foo", MakeOptions::new()).unwrap().id(), "ns/foo-v10");
}

#[test]
fn test_versioned_unversioned_mutual_exclusion() {
    let registry = Registry::new();
    registry.register(Registration::new("ns/foo", steer_factory())).unwrap();

    let err = registry
        .register(Registration::new("ns/foo-v1", steer_factory()))
        .unwrap_err();
    assert!(matches!(err, Error::RegistrationConflict { .. }));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_make_with_module_prefix() {
    let imports = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&imports);

    let registry = Registry::new();
    registry.modules().add(Arc::new(
        StaticModule::new("toy_problems")
            .with_factory("Bowl", steer_factory())
            .on_import(move |registrar| {
                counter.fetch_add(1, Ordering::SeqCst);
                registrar.register(Registration::new("toy/Bowl-v0", "toy_problems:Bowl"))
            }),
    ));

    assert!(registry.spec("toy/Bowl-v0").is_err());

    let problem = registry.make("toy_problems:toy/Bowl-v0", MakeOptions::new()).unwrap();
    assert_eq!(problem.id(), "toy/Bowl-v0");
    registry.make("toy_problems:toy/Bowl", MakeOptions::new()).unwrap();
    assert_eq!(imports.load(Ordering::SeqCst), 1);

    assert!(matches!(
        registry.make("missing_module:toy/Bowl-v0", MakeOptions::new()),
        Err(Error::EntryPointImport { .. })
    ));
}

#[test]
fn test_make_id_containing_colon() {
    let registry = Registry::new();
    registry
        .register(Registration::new("sps.tl:inj/Kick-v1", steer_factory()).with_kwarg("x", 7))
        .unwrap();

    let problem = registry.make("sps.tl:inj/Kick-v1", MakeOptions::new()).unwrap();
    assert_eq!(problem.id(), "sps.tl:inj/Kick-v1");
    assert_eq!(problem.unwrapped().downcast_ref::<Steer>().unwrap().x, 7);

    let problem = registry.make("sps.tl:inj/Kick", MakeOptions::new()).unwrap();
    assert_eq!(problem.id(), "sps.tl:inj/Kick-v1");

    // 설치된 모듈 이름이면 접두사로 취급한다
    registry.modules().add(Arc::new(
        StaticModule::new("sps.tl").with_factory("Kick", steer_factory()),
    ));
    assert!(matches!(
        registry.make("sps.tl:inj/Kick-v1", MakeOptions::new()),
        Err(Error::UnregisteredId { .. })
    ));
}

#[test]
fn test_entry_point_resolution_is_deferred() {
    let registry = Registry::new();
    registry.modules().add(Arc::new(
        StaticModule::new("acc_problems").with_factory("Steer", steer_factory()),
    ));

    // 등록 시점에는 실패하지 않는다
    registry.register(Registration::new("acc/Ghost-v1", "ghost_module:Ghost")).unwrap();
    registry.register(Registration::new("acc/Typo-v1", "acc_problems:Stear")).unwrap();
    assert!(registry.spec("acc/Ghost-v1").is_ok());

    assert!(matches!(
        registry.make("acc/Ghost-v1", MakeOptions::new()),
        Err(Error::EntryPointImport { .. })
    ));
    match registry.make("acc/Typo-v1", MakeOptions::new()) {
        Err(Error::EntryPointAttribute { attr, hint, .. }) => {
            assert_eq!(attr, "Stear");
            assert_eq!(hint.as_deref(), Some("Did you mean: `Steer`?"));
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.id())),
    }
}

#[test]
fn test_render_mode_negotiation() {
    let registry = Registry::new();
    registry.register(Registration::new("acc/Steer-v1", steer_factory())).unwrap();

    let problem = registry
        .make("acc/Steer-v1", MakeOptions::new().with_render_mode("ansi"))
        .unwrap();
    assert_eq!(problem.render_mode(), Some("ansi"));

    let mut problem = registry
        .make("acc/Steer-v1", MakeOptions::new().with_render_mode("rgb_array_list"))
        .unwrap();
    assert!(problem.downcast_ref::<RenderCollection>().is_some());
    assert_eq!(problem.render_mode(), Some("rgb_array_list"));
    assert_eq!(problem.unwrapped().render_mode(), Some("rgb_array"));

    problem.reset(None).unwrap();
    problem.step(&json!(0)).unwrap();
    problem.step(&json!(0)).unwrap();
    let frames = problem.render().unwrap().unwrap();
    assert_eq!(frames.as_array().map(Vec::len), Some(3));

    match registry.make("acc/Steer-v1", MakeOptions::new().with_render_mode("human")) {
        Err(Error::UnsupportedRenderMode { mode, supported, .. }) => {
            assert_eq!(mode, "human");
            assert_eq!(supported, vec!["ansi".to_string(), "rgb_array".to_string()]);
        }
        other => panic!("unexpected result: {:?}", other.map(|p| p.id())),
    }
}

#[test]
fn test_constructor_errors_propagate_unchanged() {
    let registry = Registry::new();
    registry
        .register(Registration::new(
            "acc/Broken-v1",
            factory(Metadata::new(), |_mode, _kwargs| {
                Err(anyhow::anyhow!("constructor exploded").into())
            }),
        ))
        .unwrap();

    let before = registry.len();
    let err = registry.make("acc/Broken-v1", MakeOptions::new()).unwrap_err();
    assert!(matches!(err, Error::Problem(_)));
    assert_eq!(err.to_string(), "constructor exploded");
    assert_eq!(registry.len(), before);
}

#[test]
fn test_manifest_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    RegistryConfig::new()
        .with_plugin("acc", "acc_problems")
        .save_to(&store)
        .unwrap();

    let config = RegistryConfig::load_from(&store).unwrap();
    let registry = Registry::from_config(&config).unwrap();
    let imports = Arc::new(AtomicUsize::new(0));
    registry.modules().add(Arc::new(acc_plugin(Arc::clone(&imports))));

    assert_eq!(registry.spec("acc/Steer").unwrap().id.to_string(), "acc/Steer-v1");
    assert_eq!(imports.load(Ordering::SeqCst), 1);
}

#[test]
fn test_global_registry_helpers() {
    optreg_core::register(Registration::new("global_scenario/Steer-v3", steer_factory())).unwrap();

    let spec = optreg_core::spec("global_scenario/Steer").unwrap();
    assert_eq!(spec.id.to_string(), "global_scenario/Steer-v3");
    assert!(optreg_core::registry()
        .iter()
        .any(|s| s.id.to_string() == "global_scenario/Steer-v3"));

    let problem = optreg_core::make("global_scenario/Steer-v3", MakeOptions::new()).unwrap();
    assert_eq!(problem.id(), "global_scenario/Steer-v3");
}
