//! # Servlet Environment Demo
//!
//! Boots a Jetty-like servlet context end to end:
//!
//! 1. Registers beans and an injection target for a host-created servlet.
//! 2. Runs the bootstrap [`Listener`], which detects the Jetty container and
//!    installs the injector and decorator.
//! 3. Plays the host: creates the servlet and lets the decorator inject it.
//!
//! Run with `RUST_LOG=debug cargo run -p webbeans-servlet` to see each step.

use std::sync::Arc;
use tracing::{error, info, warn};
use webbeans::member::Arguments;
use webbeans::tracing::setup_tracing;
use webbeans::{
    BeanManager, ConstructorTarget, FieldTarget, InitializerTarget, InjectionTarget, Qualifier,
    Scope, SimpleBean,
};
use webbeans_servlet::jetty::JETTY_DECORATING_ATTRIBUTE;
use webbeans_servlet::{
    ContainerContext, Decorator, EnvironmentConfig, EnvironmentError, InMemoryServletContext,
    Listener,
};

const DECORATOR_ATTRIBUTE: &str = "org.eclipse.jetty.webapp.decorator";

struct GreetingService {
    greeting: Arc<String>,
}

impl GreetingService {
    fn greet(&self, name: &str) -> String {
        format!("{}, {}!", self.greeting, name)
    }
}

#[derive(Default)]
struct HelloServlet {
    service: Option<Arc<GreetingService>>,
    ready: bool,
}

fn register_beans(manager: &BeanManager) -> Result<(), EnvironmentError> {
    manager.register_instance("Hello".to_string(), [Qualifier::named("greeting")]);
    manager.add_bean(
        SimpleBean::new(
            ConstructorTarget::new(|args: &Arguments| {
                Ok(GreetingService {
                    greeting: args.get(0)?,
                })
            })
            .parameter::<String>([Qualifier::named("greeting").into()]),
        )
        .map_err(webbeans::InjectionError::from)?
        .in_scope(Scope::Application),
    );

    let target = InjectionTarget::new()
        .field(FieldTarget::new(
            "service",
            [],
            |servlet: &mut HelloServlet, service: Arc<GreetingService>| {
                servlet.service = Some(service)
            },
        ))
        .and_then(|target| {
            target.initializer(InitializerTarget::new(
                "init",
                |servlet: &mut HelloServlet, _: &Arguments| {
                    servlet.ready = servlet.service.is_some();
                    info!(ready = servlet.ready, "HelloServlet initializer called");
                    Ok(())
                },
            ))
        })
        .map_err(webbeans::InjectionError::from)?;
    manager.add_injection_target(target);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), EnvironmentError> {
    setup_tracing();

    let manager = Arc::new(BeanManager::new());
    register_beans(&manager)?;
    info!(beans = manager.bean_count(), "Beans registered");
    match serde_json::to_string(&manager.descriptors()) {
        Ok(inventory) => info!(inventory = %inventory, "Bean inventory"),
        Err(e) => warn!(error = %e, "Bean inventory unavailable"),
    }

    let servlet_context = Arc::new(
        InMemoryServletContext::new()
            .with_attribute(JETTY_DECORATING_ATTRIBUTE, DECORATOR_ATTRIBUTE.to_string()),
    );
    let context = ContainerContext::new(servlet_context.clone(), manager.clone());

    let config = EnvironmentConfig::load()?;
    let listener = Listener::with_defaults(config);
    match listener.context_initialized(&context).await {
        Some(container) => info!(container = %container, "Servlet environment ready"),
        None => info!("Running without a servlet container integration"),
    }

    // the host creates a servlet and runs it through the published decorator
    let mut servlet = HelloServlet::default();
    match Decorator::lookup(&*servlet_context) {
        Some(decorator) => {
            if let Err(e) = decorator.decorate(&mut servlet) {
                error!(error = %e, "Decoration failed");
            }
        }
        None => info!("No decorator published"),
    }

    match (&servlet.service, servlet.ready) {
        (Some(service), true) => info!(response = %service.greet("world"), "HelloServlet served"),
        _ => error!("HelloServlet was not injected"),
    }

    listener.context_destroyed(&context).await;
    info!(resolutions = manager.resolutions(), "Application completed");
    Ok(())
}
