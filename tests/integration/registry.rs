//! Registry caching and resolution.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use templator::config::RegistryConfig;
use templator::core::{Error, LookupError};
use templator::fs::{DirFs, MemoryFs};
use templator::registry::Registry;
use templator::test_utils::{CountingFs, init_test_logging};

use super::common::{Page, write_tree};

const HOME: &str = "<h1>{{ Title }}</h1><p>{{ Content }}</p>";

#[test]
fn test_get_returns_same_handler() -> Result<()> {
    init_test_logging(None);
    let fs = Arc::new(CountingFs::new(MemoryFs::new().with_file("templates/home.html", HOME)));
    let registry = Registry::<Page>::new(Arc::clone(&fs))?;

    let first = registry.get("home")?;
    let second = registry.get("home")?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fs.reads("templates/home.html"), 1);
    assert_eq!(registry.stats().compilations, 1);
    assert_eq!(registry.stats().hits, 1);
    Ok(())
}

#[test]
fn test_concurrent_get_compiles_once() -> Result<()> {
    init_test_logging(None);
    const THREADS: usize = 16;

    let fs = Arc::new(
        CountingFs::new(MemoryFs::new().with_file("templates/home.html", HOME))
            .with_delay(Duration::from_millis(20)),
    );
    let registry = Arc::new(Registry::<Page>::builder(Arc::clone(&fs)).field_validation().build()?);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.get("home")
            })
        })
        .collect();

    let handlers = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(fs.reads("templates/home.html"), 1);
    assert_eq!(registry.stats().compilations, 1);
    assert!(handlers.iter().all(|h| Arc::ptr_eq(h, &handlers[0])));
    Ok(())
}

#[test]
fn test_concurrent_distinct_names() -> Result<()> {
    let names = ["a", "b", "c", "d"];
    let mut memory = MemoryFs::new();
    for name in names {
        memory = memory.with_file(&format!("templates/{name}.html"), "{{ Title }}");
    }
    let fs = Arc::new(CountingFs::new(memory).with_delay(Duration::from_millis(10)));
    let registry = Arc::new(Registry::<Page>::new(Arc::clone(&fs))?);

    thread::scope(|scope| {
        for _ in 0..3 {
            for name in names {
                let registry = &registry;
                scope.spawn(move || registry.get(name).map(|_| ()));
            }
        }
    });

    assert_eq!(registry.cached_names(), names);
    assert_eq!(fs.total_reads(), names.len());
    Ok(())
}

#[test]
fn test_missing_template() -> Result<()> {
    let registry = Registry::<Page>::new(MemoryFs::new())?;
    let err = registry.get("nonexistent").unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        &err,
        Error::Lookup(LookupError::NotFound { path, .. }) if path == "templates/nonexistent.html"
    ));
    assert!(registry.is_empty());
    Ok(())
}

#[test]
fn test_retry_after_fixing_filesystem() -> Result<()> {
    let fs = Arc::new(MemoryFs::new());
    let registry = Registry::<Page>::new(Arc::clone(&fs))?;

    assert!(registry.get("late").unwrap_err().is_not_found());
    assert!(!registry.is_cached("late"));

    fs.insert("templates/late.html", "{{ Title }}");
    let handler = registry.get("late")?;
    assert_eq!(handler.name(), "late");
    assert!(registry.is_cached("late"));
    Ok(())
}

#[test]
fn test_concurrent_failures_are_not_cached() -> Result<()> {
    const THREADS: usize = 8;
    let fs = Arc::new(
        CountingFs::new(MemoryFs::new().with_file("templates/bad.html", "{{ Nope }}"))
            .with_delay(Duration::from_millis(5)),
    );
    let registry = Arc::new(Registry::<Page>::builder(Arc::clone(&fs)).field_validation().build()?);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.get("bad").map(|_| ())
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("thread panicked")).collect();

    assert!(results.iter().all(|r| matches!(r, Err(Error::Validation(_)))));
    assert!(!registry.is_cached("bad"));
    // Every caller retried on its own.
    assert_eq!(fs.reads("templates/bad.html"), THREADS);
    Ok(())
}

#[test]
fn test_dir_fs_discover_and_preload() -> Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templates/home.html", HOME),
        ("templates/about/team.html", "{{ Title }}"),
        ("templates/README.md", "not a template"),
    ])?;

    let registry = Registry::<Page>::builder(DirFs::new(temp.path())).field_validation().build()?;
    assert_eq!(registry.discover()?, vec!["about/team", "home"]);
    assert_eq!(registry.preload()?, 2);
    assert!(registry.is_cached("about/team"));
    Ok(())
}

#[test]
fn test_config_file_settings() -> Result<()> {
    let temp = tempfile::tempdir()?;
    write_tree(temp.path(), &[
        ("templator.toml", "base_path = \"views\"\nextension = \"txt\"\n"),
        ("views/mail.txt", "Dear {{ Title }}"),
    ])?;

    let config = RegistryConfig::load(&temp.path().join("templator.toml"))?;
    let registry = Registry::<Page>::builder(DirFs::new(temp.path())).config(config).build()?;

    assert_eq!(registry.template_path("mail"), "views/mail.txt");
    assert_eq!(registry.discover()?, vec!["mail"]);
    Ok(())
}
