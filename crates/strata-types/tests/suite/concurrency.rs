use std::thread;

use pretty_assertions::assert_eq;
use strata_types::{
    AnalysisCaches, ClassSymbolProvider, ClassType, ContextId, Substitutor, SymbolStore, Type,
};

const THREADS: usize = 8;
const ROUNDS: usize = 25;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn caches_and_store_are_shareable_across_threads() {
    assert_send_sync::<AnalysisCaches>();
    assert_send_sync::<SymbolStore>();
    assert_send_sync::<Substitutor>();
}

#[test]
fn readers_share_one_cache_against_a_frozen_generation() {
    let store = SymbolStore::with_minimal_jdk();
    let caches = AnalysisCaches::default();
    let list = store.class_id("java.util.List").expect("List");
    let array_list = store.class_id("java.util.ArrayList").expect("ArrayList");
    let element = store.class(array_list).expect("ArrayList").type_params[0];
    let string = Type::class(store.well_known().string, vec![]);
    let from = Substitutor::from_pairs([(element, string.clone())]);

    let expected = caches
        .hierarchy(&store)
        .super_substitutor(list, array_list, &from)
        .expect("List is a supertype of ArrayList");
    let warm = caches.hierarchy_stats();

    let use_site = ClassType::new(
        list,
        vec![Type::extends(Type::class(store.well_known().number, vec![]))],
    );
    let context = ContextId::new(7);

    let results: Vec<(Vec<Substitutor>, ClassType)> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let hierarchy = caches.hierarchy(&store);
                    let substitutors = (0..ROUNDS)
                        .map(|_| {
                            hierarchy
                                .super_substitutor(list, array_list, &from)
                                .expect("cached result")
                        })
                        .collect();
                    let captured = caches
                        .capture_engine(&store)
                        .capture_top_level(&use_site, context);
                    (substitutors, captured)
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker panicked"))
            .collect()
    });

    let first_capture = results[0].1.clone();
    for (substitutors, captured) in &results {
        assert!(substitutors.iter().all(|s| *s == expected));
        assert_eq!(captured, &first_capture);
    }
    assert_eq!(caches.captures().len(), 1);

    let stats = caches.hierarchy_stats();
    assert_eq!(stats.hits - warm.hits, (THREADS * ROUNDS) as u64);
    assert_eq!(stats.misses, warm.misses);
}
