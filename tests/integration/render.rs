//! Rendering, cancellation and template functions.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use templator::cancel::{CancelContext, Canceler, ContextError};
use templator::core::ExecutionCause;
use templator::fs::MemoryFs;
use templator::functions::FuncMap;
use templator::registry::Registry;

use super::common::Page;

fn registry() -> Result<Registry<Page>> {
    let fs = MemoryFs::new()
        .with_file("templates/home.html", "<h1>{{ Title }}</h1><p>{{ Content }}</p>")
        .with_file("templates/shout.html", "{{ Title | shout }}");
    Ok(Registry::<Page>::builder(fs).field_validation().build()?)
}

/// Accepts writes until its context is canceled; cancels after `after` writes.
struct CancelAfter {
    canceler: Canceler,
    after: usize,
    writes: usize,
    written: Vec<u8>,
}

impl Write for CancelAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        self.writes += 1;
        if self.writes == self.after {
            self.canceler.cancel();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Cancels its context and then fails the write.
struct CancelAndFail {
    canceler: Canceler,
}

impl Write for CancelAndFail {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        self.canceler.cancel();
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_round_trip() -> Result<()> {
    let handler = registry()?.get("home")?;
    let mut out = Vec::new();
    handler.render(Some(&CancelContext::background()), &mut out, &Page::welcome())?;
    assert_eq!(String::from_utf8(out)?, "<h1>Welcome</h1><p>Hello, World!</p>");
    Ok(())
}

#[test]
fn test_text_templates_are_not_escaped() -> Result<()> {
    let fs = MemoryFs::new().with_file("templates/mail.txt", "Hi <{{ Title }}>");
    let registry = Registry::<Page>::builder(fs).extension("txt").build()?;
    let page = Page {
        title: "A & B".into(),
        content: String::new(),
    };
    let out = registry.get("mail")?.render_to_string(Some(&CancelContext::background()), &page)?;
    assert_eq!(out, "Hi <A & B>");
    Ok(())
}

#[test]
fn test_nil_context() -> Result<()> {
    let handler = registry()?.get("home")?;
    let mut out = Vec::new();
    let err = handler.render(None, &mut out, &Page::welcome()).unwrap_err();

    assert!(err.is_nil_context());
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_pre_canceled_context() -> Result<()> {
    let handler = registry()?.get("home")?;
    let (ctx, canceler) = CancelContext::background().with_cancel();
    canceler.cancel();

    let err = handler.render_to_string(Some(&ctx), &Page::welcome()).unwrap_err();
    assert_eq!(err.context_error(), Some(ContextError::Canceled));
    assert_eq!(err.to_string(), "failed to execute template 'home': 'context canceled'");
    Ok(())
}

#[test]
fn test_expired_deadline() -> Result<()> {
    let handler = registry()?.get("home")?;
    let (ctx, _canceler) = CancelContext::background().with_timeout(Duration::ZERO);

    let err = handler.render_to_string(Some(&ctx), &Page::welcome()).unwrap_err();
    assert!(err.is_deadline_exceeded());
    Ok(())
}

#[test]
fn test_parent_cancellation_reaches_child() -> Result<()> {
    let handler = registry()?.get("home")?;
    let (parent, cancel_parent) = CancelContext::background().with_cancel();
    let (child, _cancel_child) = parent.with_timeout(Duration::from_secs(60));
    cancel_parent.cancel();

    let err = handler.render_to_string(Some(&child), &Page::welcome()).unwrap_err();
    assert!(err.is_canceled());
    Ok(())
}

#[test]
fn test_cancel_during_render_stops_output() -> Result<()> {
    let handler = registry()?.get("home")?;
    let (ctx, canceler) = CancelContext::background().with_cancel();
    let mut writer = CancelAfter {
        canceler,
        after: 1,
        writes: 0,
        written: Vec::new(),
    };

    let err = handler.render(Some(&ctx), &mut writer, &Page::welcome()).unwrap_err();
    assert!(err.is_canceled());
    assert_eq!(writer.writes, 1);
    // Nothing reaches the writer once the context is done.
    let written = String::from_utf8(writer.written)?;
    assert!("<h1>Welcome</h1><p>Hello, World!</p>".starts_with(&written));
    Ok(())
}

#[test]
fn test_cancellation_wins_over_writer_error() -> Result<()> {
    let handler = registry()?.get("home")?;
    let (ctx, canceler) = CancelContext::background().with_cancel();

    let err = handler
        .render(Some(&ctx), CancelAndFail { canceler }, &Page::welcome())
        .unwrap_err();
    assert!(matches!(err.cause(), ExecutionCause::Context(ContextError::Canceled)));
    Ok(())
}

#[test]
fn test_concurrent_renders_share_handler() -> Result<()> {
    let handler = registry()?.get("home")?;

    thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let handler = Arc::clone(&handler);
                scope.spawn(move || {
                    let page = Page {
                        title: format!("Page {i}"),
                        content: "body".into(),
                    };
                    handler.render_to_string(Some(&CancelContext::background()), &page)
                })
            })
            .collect();

        for (i, worker) in workers.into_iter().enumerate() {
            let out = worker.join().expect("thread panicked").expect("render failed");
            assert_eq!(out, format!("<h1>Page {i}</h1><p>body</p>"));
        }
    });
    Ok(())
}

#[test]
fn test_registry_functions() -> Result<()> {
    let fs = MemoryFs::new().with_file("templates/shout.html", "{{ Title | shout }}");
    let registry = Registry::<Page>::builder(fs)
        .template_functions(FuncMap::new().string_filter("shout", |s| format!("{}!", s.to_uppercase())))
        .build()?;

    let out = registry.get("shout")?.render_to_string(Some(&CancelContext::background()), &Page::welcome())?;
    assert_eq!(out, "WELCOME!");
    Ok(())
}

#[test]
fn test_with_functions_does_not_touch_cached_handler() -> Result<()> {
    let registry = registry()?;
    let cached = registry.get("shout")?;
    let ctx = CancelContext::background();

    // Unknown filters only fail when rendering.
    assert!(cached.render_to_string(Some(&ctx), &Page::welcome()).is_err());

    let extended = cached.with_functions(&FuncMap::new().string_filter("shout", |s| s.to_uppercase()));
    assert_eq!(extended.render_to_string(Some(&ctx), &Page::welcome())?, "WELCOME");

    let again = registry.get("shout")?;
    assert!(Arc::ptr_eq(&cached, &again));
    assert!(!again.functions().contains("shout"));
    assert!(again.render_to_string(Some(&ctx), &Page::welcome()).is_err());
    Ok(())
}
