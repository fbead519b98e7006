use std::time::Duration;

use dioxus::prelude::*;
use services::{Notice, NoticeKind};

/// A notice prepared for the banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoticeVm {
    pub class: &'static str,
    pub role: &'static str,
    pub text: String,
    pub ttl: Option<Duration>,
}

impl From<Notice> for NoticeVm {
    fn from(notice: Notice) -> Self {
        let class = match notice.kind {
            NoticeKind::Validation => "notice notice-validation",
            NoticeKind::Network => "notice notice-network",
            NoticeKind::Server | NoticeKind::Failure => "notice notice-error",
            NoticeKind::Success => "notice notice-success",
            NoticeKind::Warning => "notice notice-warning",
            NoticeKind::Info => "notice notice-info",
        };
        let role = if notice.kind.is_error() {
            "alert"
        } else {
            "status"
        };
        Self {
            class,
            role,
            text: notice.text,
            ttl: notice.ttl,
        }
    }
}

/// Current notice of one screen. A notice with a TTL clears itself unless a
/// newer one replaced it first.
#[derive(Clone, Copy, PartialEq)]
pub struct NoticeSlot {
    current: Signal<Option<NoticeVm>>,
    generation: Signal<u64>,
}

impl NoticeSlot {
    #[must_use]
    pub fn get(&self) -> Option<NoticeVm> {
        self.current.read().clone()
    }

    pub fn show(&mut self, notice: Notice) {
        let vm = NoticeVm::from(notice);
        let ttl = vm.ttl;
        let generation = *self.generation.peek() + 1;
        self.generation.set(generation);
        self.current.set(Some(vm));

        if let Some(ttl) = ttl {
            let mut current = self.current;
            let latest = self.generation;
            spawn(async move {
                tokio::time::sleep(ttl).await;
                if *latest.peek() == generation {
                    current.set(None);
                }
            });
        }
    }

    pub fn clear(&mut self) {
        let generation = *self.generation.peek() + 1;
        self.generation.set(generation);
        self.current.set(None);
    }
}

pub fn use_notice() -> NoticeSlot {
    let current = use_signal(|| None::<NoticeVm>);
    let generation = use_signal(|| 0_u64);
    NoticeSlot {
        current,
        generation,
    }
}
