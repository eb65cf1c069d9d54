//! Test doubles shared by the scan unit tests.

use super::processor::Processor;
use crate::base::neterror::NetError;
use crate::cdn::CdnTable;
use crate::config::ScanConfig;
use crate::dns::{
    Addrs, Name, Resolve, Resolving, ReverseResolve, Reversing, Strategy, StrategyChain, StrategyId,
};
use std::{
    collections::HashMap,
    io::{self, Write},
    net::IpAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

/// In-memory writer whose contents stay readable after being boxed.
#[derive(Clone, Default)]
pub(crate) struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub(crate) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
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

/// Answers from a fixed table after a fixed delay on the tokio clock.
/// Unknown names fail.
#[derive(Default)]
pub(crate) struct TableResolver {
    answers: HashMap<String, Vec<IpAddr>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl TableResolver {
    pub(crate) fn with(mut self, domain: &str, addrs: &[&str]) -> Self {
        let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
        self.answers.insert(domain.to_string(), addrs);
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Resolve for TableResolver {
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

/// PTR answers from a fixed table; unknown addresses fail.
#[derive(Default)]
pub(crate) struct TablePtr {
    answers: HashMap<IpAddr, String>,
}

impl TablePtr {
    pub(crate) fn with(mut self, addr: &str, host: &str) -> Self {
        self.answers.insert(addr.parse().unwrap(), host.to_string());
        self
    }
}

impl ReverseResolve for TablePtr {
    fn reverse(&self, addr: IpAddr) -> Reversing {
        let answer = self.answers.get(&addr).cloned();
        Box::pin(async move {
            answer.ok_or(NetError::ReverseLookupFailed {
                addr,
                reason: "no PTR records".into(),
            })
        })
    }
}

/// A processor whose only strategy is `resolver`, with an always-failing
/// fallback.
pub(crate) fn processor(
    resolver: Arc<TableResolver>,
    ptr: TablePtr,
    config: &ScanConfig,
) -> Processor {
    let chain = StrategyChain::new(
        vec![Strategy::new(StrategyId::System, resolver)],
        Strategy::new(StrategyId::Fallback, Arc::new(TableResolver::default())),
        config.dns_timeout,
    )
    .with_attempt_delay(config.attempt_delay);

    Processor::new(
        Arc::new(chain),
        Arc::new(CdnTable::builtin()),
        Arc::new(ptr),
        config,
    )
}
