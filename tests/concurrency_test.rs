use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use webbeans::constructor::{ComponentConstructor, SimpleConstructor};
use webbeans::{Arguments, BeanManager, ConstructorTarget, InstanceBean, Scope, SimpleBean};

struct Pool {
    size: Arc<usize>,
}

struct Handler {
    pool: Arc<Pool>,
    id: usize,
}

/// One shared constructor, many concurrent invocations.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invoke_on_shared_constructor() {
    let manager = Arc::new(BeanManager::new());
    manager.add_bean(InstanceBean::new(16usize));
    manager.add_bean(
        SimpleBean::new(
            ConstructorTarget::new(|args: &Arguments| Ok(Pool { size: args.get(0)? }))
                .parameter::<usize>([]),
        )
        .unwrap()
        .in_scope(Scope::Application),
    );

    let next_id = Arc::new(AtomicUsize::new(0));
    let ids = next_id.clone();
    let constructor = Arc::new(
        SimpleConstructor::new(
            ConstructorTarget::new(move |args: &Arguments| {
                Ok(Handler {
                    pool: args.get(0)?,
                    id: ids.fetch_add(1, Ordering::SeqCst),
                })
            })
            .parameter::<Pool>([]),
        )
        .unwrap(),
    );

    let mut handles = Vec::new();
    for _ in 0..32 {
        let manager = manager.clone();
        let constructor = constructor.clone();
        handles.push(tokio::spawn(async move {
            constructor.invoke(&*manager)
        }));
    }

    let mut handlers = Vec::new();
    for handle in handles {
        handlers.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(handlers.len(), 32);
    assert_eq!(next_id.load(Ordering::SeqCst), 32);
    let mut seen: Vec<usize> = handlers.iter().map(|h| h.id).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 32);

    // every handler got the one application-scoped pool
    let first = &handlers[0].pool;
    assert!(handlers.iter().all(|h| Arc::ptr_eq(&h.pool, first)));
    assert_eq!(*first.size, 16);
}

#[tokio::test]
async fn test_registration_while_resolving() {
    let manager = Arc::new(BeanManager::new());
    manager.add_bean(InstanceBean::new(1u32));

    let writer = {
        let manager = manager.clone();
        tokio::spawn(async move {
            for i in 0..100u64 {
                manager.add_bean(InstanceBean::new(i).named(format!("n{}", i)));
                tokio::task::yield_now().await;
            }
        })
    };
    let reader = {
        let manager = manager.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                assert_eq!(*manager.instance::<u32>(&[]).unwrap(), 1);
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
    assert_eq!(manager.bean_count(), 101);
}
