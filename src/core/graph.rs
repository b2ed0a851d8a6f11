//! Step graph - named step references compiled into executable nodes
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A step
//! that is reachable through several paths is bound once and shared, so
//! the compiled form is a DAG. Loops between steps are rejected with
//! [`ConfigError::Cycle`].

use crate::core::{
    error::ConfigError,
    step::{NextStep, StepKind, StepRecord, StepRegistry},
};
use std::collections::{HashMap, HashSet};

/// Sequence number reported for terminals
pub const TERMINAL_SEQUENCE: i64 = -1;

/// Name given to terminals synthesized from `end` or a missing transition
pub const DEFAULT_END: &str = "Default End";

/// Index of a node in a [`StepGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Pipeline completion with a fixed result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub name: String,
    pub result: bool,
}

impl Terminal {
    fn synthesized(result: bool) -> Self {
        Self {
            name: DEFAULT_END.to_string(),
            result,
        }
    }
}

/// Destination of an edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Step(NodeId),
    End(Terminal),
}

impl Target {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Target::End(_))
    }
}

/// An execution-ready step
#[derive(Debug, Clone)]
pub struct StepNode {
    /// Position in visitation order, starting at 1
    pub sequence: i64,
    pub name: String,
    pub kind: StepKind,
    pub on_success: Target,
    pub on_failure: Target,
}

impl StepNode {
    /// Edge to follow for the given step result
    pub fn next(&self, success: bool) -> &Target {
        if success {
            &self.on_success
        } else {
            &self.on_failure
        }
    }
}

/// Compiled pipeline
#[derive(Debug, Clone)]
pub struct StepGraph {
    nodes: Vec<StepNode>,
    root: Target,
}

impl StepGraph {
    /// Compile the step named `root` and everything reachable from it
    pub fn compile(root: &str, registry: &StepRegistry) -> Result<Self, ConfigError> {
        if root.is_empty() {
            return Err(ConfigError::MissingRoot);
        }

        let record = registry
            .find(root)
            .ok_or_else(|| ConfigError::RootNotFound(root.to_string()))?;

        let mut compiler = Compiler {
            registry,
            nodes: Vec::new(),
            bound: HashMap::new(),
            on_stack: HashSet::new(),
            frames: Vec::new(),
        };
        let root = compiler.bind(record)?;

        Ok(Self {
            nodes: compiler.nodes,
            root,
        })
    }

    pub fn root(&self) -> &Target {
        &self.root
    }

    pub fn node(&self, id: NodeId) -> &StepNode {
        &self.nodes[id.0]
    }

    /// Nodes in sequence order
    pub fn nodes(&self) -> &[StepNode] {
        &self.nodes
    }

    /// Find a compiled node by step name
    pub fn find(&self, name: &str) -> Option<&StepNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Display name of an edge target
    pub fn target_name<'a>(&'a self, target: &'a Target) -> &'a str {
        match target {
            Target::Step(id) => &self.node(*id).name,
            Target::End(terminal) => &terminal.name,
        }
    }

    /// Sequence number of an edge target
    pub fn target_sequence(&self, target: &Target) -> i64 {
        match target {
            Target::Step(id) => self.node(*id).sequence,
            Target::End(_) => TERMINAL_SEQUENCE,
        }
    }
}

struct Compiler<'a> {
    registry: &'a StepRegistry,
    nodes: Vec<StepNode>,
    bound: HashMap<&'a str, NodeId>,
    on_stack: HashSet<&'a str>,
    frames: Vec<Frame<'a>>,
}

/// A node whose edges are still being resolved
struct Frame<'a> {
    id: NodeId,
    record: &'a StepRecord,
    /// Set once the success edge is resolved; the failure edge is next
    on_success: Option<Target>,
}

/// Where an edge leads before its target is bound
enum Edge<'a> {
    End(Terminal),
    Step(&'a StepRecord),
}

impl<'a> Compiler<'a> {
    /// Bind `root` and everything reachable from it, success edges first
    fn bind(&mut self, root: &'a StepRecord) -> Result<Target, ConfigError> {
        let root_id = NodeId(self.nodes.len());
        if let Some(target) = self.enter(root)? {
            return Ok(target);
        }

        let mut resolved: Option<Target> = None;
        while let Some(mut frame) = self.frames.pop() {
            match (resolved.take(), frame.on_success.take()) {
                (Some(target), None) => {
                    frame.on_success = Some(target);
                    self.frames.push(frame);
                }
                (Some(on_failure), Some(on_success)) => {
                    self.on_stack.remove(frame.record.name.as_str());
                    let node = &mut self.nodes[frame.id.0];
                    node.on_success = on_success;
                    node.on_failure = on_failure;
                    resolved = Some(Target::Step(frame.id));
                }
                (None, on_success) => {
                    let edge = match on_success {
                        None => self.success_edge(frame.record)?,
                        Some(_) => self.failure_edge(frame.record)?,
                    };
                    frame.on_success = on_success;
                    self.frames.push(frame);
                    resolved = match edge {
                        Edge::End(terminal) => Some(Target::End(terminal)),
                        Edge::Step(next) => self.enter(next)?,
                    };
                }
            }
        }

        Ok(Target::Step(root_id))
    }

    /// Resolve `record` to a target, or reserve its node and push a frame
    /// when its edges still need resolving
    fn enter(&mut self, record: &'a StepRecord) -> Result<Option<Target>, ConfigError> {
        if let StepKind::End { result } = record.kind {
            return Ok(Some(Target::End(Terminal {
                name: record.name.clone(),
                result,
            })));
        }

        let name = record.name.as_str();
        if self.on_stack.contains(name) {
            let mut path: Vec<String> = self
                .frames
                .iter()
                .map(|frame| frame.record.name.as_str())
                .skip_while(|n| *n != name)
                .map(str::to_string)
                .collect();
            path.push(name.to_string());
            return Err(ConfigError::Cycle { path });
        }
        if let Some(id) = self.bound.get(name) {
            return Ok(Some(Target::Step(*id)));
        }

        // Reserve the slot first so the sequence reflects visitation order
        let id = NodeId(self.nodes.len());
        self.nodes.push(StepNode {
            sequence: self.nodes.len() as i64 + 1,
            name: record.name.clone(),
            kind: record.kind.clone(),
            on_success: Target::End(Terminal::synthesized(true)),
            on_failure: Target::End(Terminal::synthesized(false)),
        });
        self.bound.insert(name, id);
        self.on_stack.insert(name);
        self.frames.push(Frame {
            id,
            record,
            on_success: None,
        });

        Ok(None)
    }

    fn success_edge(&self, record: &'a StepRecord) -> Result<Edge<'a>, ConfigError> {
        match &record.success {
            NextStep::End => Ok(Edge::End(Terminal::synthesized(true))),
            NextStep::Named(target) => {
                let next = self.registry.find(target).ok_or_else(|| {
                    ConfigError::MissingSuccessStep {
                        step: record.name.clone(),
                        target: target.clone(),
                    }
                })?;
                Ok(Edge::Step(next))
            }
        }
    }

    fn failure_edge(&self, record: &'a StepRecord) -> Result<Edge<'a>, ConfigError> {
        match record.effective_failure() {
            NextStep::End => Ok(Edge::End(Terminal::synthesized(false))),
            NextStep::Named(target) => {
                let next = self.registry.find(target).ok_or_else(|| {
                    ConfigError::MissingFailureStep {
                        step: record.name.clone(),
                        failure: record.failure_raw.clone().unwrap_or_default(),
                        target: target.clone(),
                    }
                })?;
                Ok(Edge::Step(next))
            }
        }
    }
}
