use std::sync::Arc;
use webbeans::member::Arguments;
use webbeans::{
    BeanManager, ConstructorTarget, FieldTarget, InitializerTarget, InjectionTarget, Scope,
    SimpleBean,
};
use webbeans_servlet::container::Container;
use webbeans_servlet::injector::INJECTOR_ATTRIBUTE_NAME;
use webbeans_servlet::jetty::{JETTY_CDI_ATTRIBUTE, JETTY_CDI_VALUE, JETTY_DECORATING_ATTRIBUTE, JETTY_LEGACY_PROBE_CLASS};
use webbeans_servlet::mock::RecordingServletContext;
use webbeans_servlet::{
    ContainerContext, Decorator, EnvironmentConfig, InMemoryServletContext, JettyContainer,
    JettyInjector, Listener, StaticResourceLoader,
};

const WATCHED: &str = "org.eclipse.jetty.webapp.decorator";

struct Repository {
    url: Arc<String>,
}

#[derive(Default)]
struct AccountServlet {
    repository: Option<Arc<Repository>>,
    started: bool,
}

fn manager() -> Arc<BeanManager> {
    let manager = Arc::new(BeanManager::new());
    manager.register_instance("jdbc:h2:mem".to_string(), []);
    manager.add_bean(
        SimpleBean::new(
            ConstructorTarget::new(|args: &Arguments| Ok(Repository { url: args.get(0)? }))
                .parameter::<String>([]),
        )
        .unwrap()
        .in_scope(Scope::Application),
    );
    manager.add_injection_target(
        InjectionTarget::new()
            .field(FieldTarget::new(
                "repository",
                [],
                |s: &mut AccountServlet, r: Arc<Repository>| s.repository = Some(r),
            ))
            .and_then(|target| {
                target.initializer(InitializerTarget::new(
                    "init",
                    |s: &mut AccountServlet, _: &Arguments| {
                        s.started = s.repository.is_some();
                        Ok(())
                    },
                ))
            })
            .unwrap(),
    );
    manager
}

/// Full path: listener detects Jetty, host objects get injected through the decorator.
#[tokio::test]
async fn test_host_objects_are_injected() {
    let servlet_context = Arc::new(RecordingServletContext::new(
        InMemoryServletContext::new().with_attribute(JETTY_DECORATING_ATTRIBUTE, WATCHED.to_string()),
    ));
    let context = ContainerContext::new(servlet_context.clone(), manager());
    let listener = Listener::with_defaults(EnvironmentConfig::default());

    let selected = listener.context_initialized(&context).await;
    assert_eq!(selected.as_deref(), Some(JettyContainer::NAME));

    let decorator = Decorator::lookup(&*servlet_context).expect("decorator published");
    let mut first = AccountServlet::default();
    let mut second = AccountServlet::default();
    assert!(decorator.decorate(&mut first).unwrap());
    assert!(decorator.decorate(&mut second).unwrap());

    assert!(first.started && second.started);
    let first = first.repository.expect("first servlet injected");
    let second = second.repository.expect("second servlet injected");
    assert_eq!(first.url.as_str(), "jdbc:h2:mem");
    assert!(Arc::ptr_eq(&first, &second));

    // objects without an injection target pass through untouched
    let mut unrelated = String::from("filter");
    assert!(!decorator.decorate(&mut unrelated).unwrap());

    listener.context_destroyed(&context).await;
}

/// Re-running initialization never registers a second injector or decorator.
#[tokio::test]
async fn test_initialize_is_idempotent() {
    let servlet_context = Arc::new(RecordingServletContext::new(
        InMemoryServletContext::new().with_attribute(JETTY_DECORATING_ATTRIBUTE, WATCHED.to_string()),
    ));
    let context = ContainerContext::new(servlet_context.clone(), manager());

    let container = JettyContainer;
    container.initialize(&context).await;
    let injector = JettyInjector::lookup(&*servlet_context).unwrap();
    container.initialize(&context).await;

    assert_eq!(servlet_context.set_count(INJECTOR_ATTRIBUTE_NAME), 1);
    assert_eq!(servlet_context.set_count(WATCHED), 1);
    assert!(Arc::ptr_eq(
        &injector,
        &JettyInjector::lookup(&*servlet_context).unwrap()
    ));

    let listener = Listener::with_defaults(EnvironmentConfig::default());
    listener.context_initialized(&context).await;
    listener.context_initialized(&context).await;
    assert_eq!(servlet_context.total_sets(), 2);
}

#[tokio::test]
async fn test_cdi_spi_host_gets_no_injector() {
    let servlet_context = Arc::new(RecordingServletContext::new(
        InMemoryServletContext::new().with_attribute(JETTY_CDI_ATTRIBUTE, JETTY_CDI_VALUE.to_string()),
    ));
    let context = ContainerContext::new(servlet_context.clone(), manager());
    let listener = Listener::with_defaults(EnvironmentConfig::default());

    assert_eq!(
        listener.context_initialized(&context).await.as_deref(),
        Some(JettyContainer::NAME)
    );
    assert_eq!(servlet_context.total_sets(), 0);
    assert!(Decorator::lookup(&*servlet_context).is_none());
}

#[tokio::test]
async fn test_legacy_host_detected_through_loader() {
    let servlet_context = Arc::new(RecordingServletContext::new(InMemoryServletContext::new()));
    let context = ContainerContext::new(servlet_context.clone(), manager());
    let listener = Listener::with_defaults(EnvironmentConfig::default())
        .with_loader(Arc::new(StaticResourceLoader::new([JETTY_LEGACY_PROBE_CLASS])));

    assert_eq!(
        listener.context_initialized(&context).await.as_deref(),
        Some("jetty-legacy")
    );
    assert_eq!(servlet_context.set_count(INJECTOR_ATTRIBUTE_NAME), 1);

    let injector = JettyInjector::lookup(&*servlet_context).unwrap();
    let mut servlet = AccountServlet::default();
    assert!(injector.inject(&mut servlet).unwrap());
    assert!(servlet.repository.is_some());
}

#[tokio::test]
async fn test_unknown_host() {
    let servlet_context = Arc::new(RecordingServletContext::new(InMemoryServletContext::new()));
    let context = ContainerContext::new(servlet_context.clone(), manager());
    let listener = Listener::with_defaults(EnvironmentConfig::default());

    assert!(listener.context_initialized(&context).await.is_none());
    assert_eq!(servlet_context.total_sets(), 0);
}

#[tokio::test]
async fn test_init_parameter_forces_container() {
    let servlet_context = Arc::new(RecordingServletContext::new(
        InMemoryServletContext::new()
            .with_init_parameter("webbeans.environment.container", "jetty-legacy")
            .with_attribute(JETTY_DECORATING_ATTRIBUTE, WATCHED.to_string()),
    ));
    let context = ContainerContext::new(servlet_context.clone(), manager());
    let listener = Listener::with_defaults(EnvironmentConfig::default());

    assert_eq!(
        listener.context_initialized(&context).await.as_deref(),
        Some("jetty-legacy")
    );
    // legacy integration installs the injector only
    assert_eq!(servlet_context.set_count(INJECTOR_ATTRIBUTE_NAME), 1);
    assert_eq!(servlet_context.set_count(WATCHED), 0);
}
