use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use copy_page::scheduler::{LocalFuture, Task};
use copy_page::{ClipboardHost, Dom, Host, MemoryDocument, NodeId, Scheduler};
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

pub type TestHost = Host<MemoryDocument, VirtualScheduler, ScriptedClipboard>;

/// Timers on a virtual clock, animation frames run on demand and a local executor.
pub struct VirtualScheduler {
    now: Cell<u32>,
    sequence: Cell<u64>,
    timers: RefCell<Vec<(u32, u64, Task)>>,
    frames: RefCell<Vec<Task>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now: Cell::new(0),
            sequence: Cell::new(0),
            timers: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }
}

impl VirtualScheduler {
    pub fn now(&self) -> u32 {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Runs spawned tasks until none can make progress.
    pub fn run_tasks(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Runs the animation frame callbacks queued so far.
    pub fn run_frames(&self) {
        let frames = std::mem::take(&mut *self.frames.borrow_mut());
        for frame in frames {
            frame();
        }
    }

    /// Moves the clock forward, firing due timers in order.
    pub fn advance(&self, ms: u32) {
        let target = self.now.get() + ms;

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, (at, _, _))| *at <= target)
                    .min_by_key(|(_, (at, sequence, _))| (*at, *sequence))
                    .map(|(index, _)| index);
                due.map(|index| timers.remove(index))
            };
            let Some((at, _, task)) = next else {
                break;
            };

            self.now.set(at);
            task();
            self.run_tasks();
        }

        self.now.set(target);
    }
}

impl Scheduler for VirtualScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Task) {
        let sequence = self.sequence.get();
        self.sequence.set(sequence + 1);
        self.timers
            .borrow_mut()
            .push((self.now.get().saturating_add(delay_ms), sequence, task));
    }

    fn request_animation_frame(&self, task: Task) {
        self.frames.borrow_mut().push(task);
    }

    fn spawn_local(&self, future: LocalFuture) {
        self.spawner
            .spawn_local(future)
            .expect("local pool is alive");
    }
}

/// A clipboard whose capabilities are set per test. Fallback copies read the selected node.
pub struct ScriptedClipboard {
    dom: Rc<MemoryDocument>,
    pub secure: Cell<bool>,
    pub native: Cell<bool>,
    pub rejection: RefCell<Option<String>>,
    pub selection: Cell<bool>,
    pub command_succeeds: Cell<bool>,
    selected: Cell<Option<NodeId>>,
    pub written: RefCell<Vec<String>>,
}

impl ScriptedClipboard {
    pub fn new(dom: Rc<MemoryDocument>) -> Self {
        Self {
            dom,
            secure: Cell::new(true),
            native: Cell::new(true),
            rejection: RefCell::new(None),
            selection: Cell::new(true),
            command_succeeds: Cell::new(true),
            selected: Cell::new(None),
            written: RefCell::new(Vec::new()),
        }
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected.get()
    }
}

#[async_trait(?Send)]
impl ClipboardHost for ScriptedClipboard {
    type Node = NodeId;

    fn is_secure_context(&self) -> bool {
        self.secure.get()
    }

    fn has_async_clipboard(&self) -> bool {
        self.native.get()
    }

    async fn write_text(&self, text: &str) -> Result<(), String> {
        if let Some(reason) = self.rejection.borrow().clone() {
            return Err(reason);
        }
        self.written.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn select_node(&self, node: &NodeId) -> bool {
        if self.selection.get() {
            self.selected.set(Some(*node));
        }
        self.selection.get()
    }

    fn clear_selection(&self) {
        self.selected.set(None);
    }

    fn exec_copy(&self) -> bool {
        match self.selected.get() {
            Some(node) if self.command_succeeds.get() => {
                self.written.borrow_mut().push(self.dom.text_content(&node));
                true
            }
            _ => false,
        }
    }
}

/// A parsed page wired to a virtual scheduler and a scripted clipboard.
pub struct Page {
    pub dom: Rc<MemoryDocument>,
    pub scheduler: Rc<VirtualScheduler>,
    pub clipboard: Rc<ScriptedClipboard>,
}

impl Page {
    pub fn new(html: &str) -> Self {
        let dom = Rc::new(MemoryDocument::parse(html));
        let clipboard = Rc::new(ScriptedClipboard::new(Rc::clone(&dom)));
        Self {
            dom,
            scheduler: Rc::new(VirtualScheduler::default()),
            clipboard,
        }
    }

    pub fn host(&self) -> TestHost {
        Host::new(
            Rc::clone(&self.dom),
            Rc::clone(&self.scheduler),
            Rc::clone(&self.clipboard),
        )
    }

    /// Clicks `node` and lets the copy task and the first animation frame run.
    pub fn click(&self, node: NodeId) {
        self.dom.dispatch(node, "click");
        self.scheduler.run_tasks();
        self.scheduler.run_frames();
    }

    pub fn button(&self) -> NodeId {
        self.dom
            .query_selector(".sl-copy-button")
            .expect("copy button is mounted")
    }

    pub fn tooltips(&self) -> Vec<NodeId> {
        self.dom.query_selector_all(".sl-copy-button-live-region .sl-copy-button-feedback")
    }

    pub fn tooltip_texts(&self) -> Vec<String> {
        self.tooltips()
            .iter()
            .map(|node| self.dom.text_content(node))
            .collect()
    }

    pub fn written(&self) -> Vec<String> {
        self.clipboard.written.borrow().clone()
    }
}

pub fn docs_page(title: &str, content: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head><title>{title} | Docs</title></head>
  <body>
    <main>
      <div class="content-panel"><h1 id="_top">{title}</h1></div>
      <div class="content-panel"><div class="sl-markdown-content">{content}</div></div>
    </main>
  </body>
</html>"#
    )
}
