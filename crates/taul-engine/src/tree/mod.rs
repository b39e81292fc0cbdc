//! Parse trees.
//!
//! A parse tree is a flat, append-only list of events (open-syntactic,
//! lexical, close, abort) that replays deterministically through a
//! listener. Navigation is index arithmetic over the event list: every
//! syntactic event records where its subtree ends and who its parent is,
//! so there are no parent/child/sibling pointer cycles to maintain.

use taul_core::{Grammar, PprRef, SourcePos, Symbol, Token};

use crate::listener::Listener;


const NO_INDEX: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TreeEvent {
    Syntactic {
        ppr: u32,
        pos: SourcePos,
        /// Index of the matching close event; patched when it arrives.
        end: u32,
        /// Index of the enclosing syntactic event, or `NO_INDEX` at root.
        parent: u32,
    },
    Lexical {
        token: Token,
    },
    Close,
    Abort {
        pos: SourcePos,
    },
}

/// A sealed or under-construction parse tree.
///
/// The builder methods (`syntactic`, `lexical`, `close`, `abort`) are
/// driven by the parser; callers normally only inspect, replay, or
/// navigate the finished tree.
#[derive(Clone, Debug)]
pub struct ParseTree {
    gram: Grammar,
    events: Vec<TreeEvent>,
    /// Indices of open syntactic events.
    open: Vec<u32>,
    opened_any: bool,
    aborted: bool,
}

impl ParseTree {
    pub fn new(gram: Grammar) -> Self {
        Self {
            gram,
            events: Vec::new(),
            open: Vec::new(),
            opened_any: false,
            aborted: false,
        }
    }

    /// Open a nonterminal subtree at `pos`.
    pub fn syntactic(&mut self, ppr: PprRef<'_>, pos: SourcePos) {
        if self.aborted {
            return;
        }
        let index = self.events.len() as u32;
        let parent = self.open.last().copied().unwrap_or(NO_INDEX);
        self.events.push(TreeEvent::Syntactic {
            ppr: ppr.index(),
            pos,
            end: NO_INDEX,
            parent,
        });
        self.open.push(index);
        self.opened_any = true;
    }

    /// Append a leaf token (normal or failure).
    pub fn lexical(&mut self, token: Token) {
        if self.aborted {
            return;
        }
        self.events.push(TreeEvent::Lexical { token });
    }

    /// Close the innermost open subtree.
    ///
    /// # Panics
    /// Panics if no subtree is open; that is a driver bug, not an input
    /// condition.
    pub fn close(&mut self) {
        let opened = self
            .open
            .pop()
            .expect("close requires an open syntactic frame");
        let at = self.events.len() as u32;
        self.events.push(TreeEvent::Close);
        match &mut self.events[opened as usize] {
            TreeEvent::Syntactic { end, .. } => *end = at,
            _ => unreachable!("open stack only holds syntactic events"),
        }
    }

    /// Seal the tree in the aborted state. Later `syntactic`/`lexical`
    /// events are suppressed; the outstanding `close` calls still land so
    /// the event sequence stays well-bracketed.
    pub fn abort(&mut self, pos: SourcePos) {
        if self.aborted {
            return;
        }
        self.aborted = true;
        self.events.push(TreeEvent::Abort { pos });
    }

    /// Whether construction has finished (every opened subtree closed).
    pub fn is_sealed(&self) -> bool {
        self.opened_any && self.open.is_empty()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Source position of the abort event, if the tree aborted.
    pub fn abort_pos(&self) -> Option<SourcePos> {
        self.events.iter().find_map(|event| match event {
            TreeEvent::Abort { pos } => Some(*pos),
            _ => None,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.gram
    }

    /// Number of recorded events.
    pub fn events_len(&self) -> usize {
        self.events.len()
    }

    /// Replay the tree through a listener, reproducing the exact callback
    /// sequence of the parse that built it.
    pub fn playback(&self, listener: &mut dyn Listener) {
        listener.on_startup();
        for event in &self.events {
            match *event {
                TreeEvent::Syntactic { ppr, pos, .. } => {
                    listener.on_syntactic(self.gram.ppr_at(ppr as usize), pos);
                }
                TreeEvent::Lexical { token } => listener.on_lexical(token),
                TreeEvent::Close => listener.on_close(),
                TreeEvent::Abort { pos } => listener.on_abort(pos),
            }
        }
        listener.on_shutdown();
    }

    /// The root node, once the tree is sealed and has one.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        match self.events.first() {
            Some(TreeEvent::Syntactic { .. }) => Some(NodeRef {
                tree: self,
                index: 0,
            }),
            _ => None,
        }
    }
}

impl PartialEq for ParseTree {
    fn eq(&self, other: &Self) -> bool {
        self.events == other.events && self.aborted == other.aborted
    }
}

/// Cursor over one node of a sealed tree: an index pair, not a pointer.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t ParseTree,
    index: u32,
}

impl<'t> NodeRef<'t> {
    fn event(&self) -> &'t TreeEvent {
        &self.tree.events[self.index as usize]
    }

    pub fn is_syntactic(&self) -> bool {
        matches!(self.event(), TreeEvent::Syntactic { .. })
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.event(), TreeEvent::Lexical { .. })
    }

    /// The PPR of a syntactic node.
    pub fn ppr(&self) -> Option<PprRef<'t>> {
        match self.event() {
            TreeEvent::Syntactic { ppr, .. } => Some(self.tree.gram.ppr_at(*ppr as usize)),
            _ => None,
        }
    }

    /// The token of a lexical node.
    pub fn token(&self) -> Option<Token> {
        match self.event() {
            TreeEvent::Lexical { token } => Some(*token),
            _ => None,
        }
    }

    pub fn pos(&self) -> SourcePos {
        match self.event() {
            TreeEvent::Syntactic { pos, .. } => *pos,
            TreeEvent::Lexical { token } => token.pos(),
            TreeEvent::Close | TreeEvent::Abort { .. } => unreachable!("not a node event"),
        }
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        let parent = match self.event() {
            TreeEvent::Syntactic { parent, .. } => *parent,
            // a leaf's parent is the innermost syntactic event before it
            // whose subtree spans it
            TreeEvent::Lexical { .. } => self.enclosing_syntactic()?,
            _ => return None,
        };
        if parent == NO_INDEX {
            return None;
        }
        Some(NodeRef {
            tree: self.tree,
            index: parent,
        })
    }

    fn enclosing_syntactic(&self) -> Option<u32> {
        let me = self.index;
        self.tree
            .events
            .iter()
            .enumerate()
            .take(me as usize)
            .rev()
            .find_map(|(i, event)| match event {
                TreeEvent::Syntactic { end, .. } if *end != NO_INDEX && *end > me => Some(i as u32),
                _ => None,
            })
    }

    /// Child nodes of a syntactic node, left to right.
    pub fn children(&self) -> Children<'t> {
        let (cursor, end) = match self.event() {
            TreeEvent::Syntactic { end, .. } if *end != NO_INDEX => (self.index + 1, *end),
            _ => (self.index, self.index),
        };
        Children {
            tree: self.tree,
            cursor,
            end,
        }
    }

    /// Next sibling within the same parent.
    pub fn next_sibling(&self) -> Option<NodeRef<'t>> {
        let parent = self.parent()?;
        let after = match self.event() {
            TreeEvent::Syntactic { end, .. } => *end + 1,
            _ => self.index + 1,
        };
        let TreeEvent::Syntactic { end, .. } = parent.event() else {
            return None;
        };
        let mut siblings = Children {
            tree: self.tree,
            cursor: after,
            end: *end,
        };
        siblings.next()
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.event() {
            TreeEvent::Syntactic { ppr, pos, .. } => {
                write!(f, "NodeRef(syntactic {} at {})", ppr, pos)
            }
            TreeEvent::Lexical { token } => write!(f, "NodeRef(lexical {token})"),
            other => write!(f, "NodeRef({other:?})"),
        }
    }
}

/// Iterator over the children of a syntactic node.
pub struct Children<'t> {
    tree: &'t ParseTree,
    cursor: u32,
    end: u32,
}

impl<'t> Iterator for Children<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<NodeRef<'t>> {
        while self.cursor < self.end {
            let index = self.cursor;
            match self.tree.events[index as usize] {
                TreeEvent::Syntactic { end, .. } => {
                    // skip the whole subtree, close event included
                    self.cursor = if end == NO_INDEX { self.end } else { end + 1 };
                    return Some(NodeRef {
                        tree: self.tree,
                        index,
                    });
                }
                TreeEvent::Lexical { .. } => {
                    self.cursor += 1;
                    return Some(NodeRef {
                        tree: self.tree,
                        index,
                    });
                }
                TreeEvent::Close | TreeEvent::Abort { .. } => self.cursor += 1,
            }
        }
        None
    }
}
