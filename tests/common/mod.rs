//! Mock strategies and writers shared by the integration tests.

#![allow(dead_code)]

use sanresolver::base::neterror::NetError;
use sanresolver::cdn::CdnTable;
use sanresolver::config::ScanConfig;
use sanresolver::dns::{
    Addrs, Name, Resolve, Resolving, ReverseResolve, Reversing, Strategy, StrategyChain, StrategyId,
};
use sanresolver::scan::{Pipeline, Processor};
use std::collections::HashMap;
use std::io::{self, Write};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn sorted_lines(&self) -> Vec<String> {
        let mut lines = self.lines();
        lines.sort();
        lines
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer whose first write stalls the writing thread for a while, like a
/// slow downstream pipe.
pub struct StallingWriter {
    inner: SharedBuf,
    stall: Duration,
    stalled: bool,
}

impl StallingWriter {
    pub fn new(inner: SharedBuf, stall: Duration) -> Self {
        Self {
            inner,
            stall,
            stalled: false,
        }
    }
}

impl Write for StallingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.stalled {
            self.stalled = true;
            std::thread::sleep(self.stall);
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Answers from a fixed table after a fixed delay. Unknown names fail.
#[derive(Default)]
pub struct MockResolver {
    answers: HashMap<String, Vec<IpAddr>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn with(mut self, domain: &str, addrs: &[&str]) -> Self {
        let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.answers.insert(domain.to_string(), addrs);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolve for MockResolver {
    fn resolve(&self, name: Name) -> Resolving {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.get(name.as_str()).cloned();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match answer {
                Some(addrs) => Ok(Box::new(addrs.into_iter()) as Addrs),
                None => Err(NetError::dns_failed_msg(name.as_str(), "NXDOMAIN")),
            }
        })
    }
}

/// PTR answers from a fixed table, each after its own delay.
#[derive(Default)]
pub struct MockPtr {
    answers: HashMap<IpAddr, (String, Duration)>,
}

impl MockPtr {
    pub fn with(self, addr: &str, host: &str) -> Self {
        self.slow(addr, host, Duration::ZERO)
    }

    pub fn slow(mut self, addr: &str, host: &str, delay: Duration) -> Self {
        self.answers
            .insert(addr.parse().unwrap(), (host.to_string(), delay));
        self
    }
}

impl ReverseResolve for MockPtr {
    fn reverse(&self, addr: IpAddr) -> Reversing {
        let answer = self.answers.get(&addr).cloned();
        Box::pin(async move {
            match answer {
                Some((host, delay)) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(host)
                }
                None => Err(NetError::ReverseLookupFailed {
                    addr,
                    reason: "no PTR records".into(),
                }),
            }
        })
    }
}

/// A pipeline whose strategies are `strategies` in order, with `fallback`
/// as the generic host lookup.
pub fn pipeline_with(
    config: ScanConfig,
    strategies: Vec<Strategy>,
    fallback: Arc<dyn Resolve>,
    ptr: MockPtr,
) -> Pipeline {
    let chain = StrategyChain::new(
        strategies,
        Strategy::new(StrategyId::Fallback, fallback),
        config.dns_timeout,
    )
    .with_attempt_delay(config.attempt_delay);
    let processor = Processor::new(
        Arc::new(chain),
        Arc::new(CdnTable::builtin()),
        Arc::new(ptr),
        &config,
    );
    Pipeline::new(config, processor)
}

/// A pipeline with one system strategy and a failing fallback.
pub fn pipeline(config: ScanConfig, resolver: Arc<MockResolver>, ptr: MockPtr) -> Pipeline {
    pipeline_with(
        config,
        vec![Strategy::new(StrategyId::System, resolver)],
        Arc::new(MockResolver::default()),
        ptr,
    )
}
