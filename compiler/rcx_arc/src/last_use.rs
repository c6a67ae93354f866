//! Last-use analysis under branching control flow.
//!
//! Given a block and a binding, computes the set of safe release-insertion
//! points: the places where, on each exclusive control path, the binding
//! has been mentioned for the last time before the scope exits.
//!
//! # Algorithm
//!
//! Statements are scanned in order, tracking a single **straight-line
//! candidate** that every later non-branching mention overwrites. An
//! `if`/`else` needs care:
//!
//! - A **condition** mention makes the whole `if` the candidate — branch
//!   choice is unresolved statically, so the use cannot be attributed to
//!   one side.
//! - A block branch is recursed. Mentions on paths that **exit the
//!   function** (returns, and everything inside a branch all of whose
//!   paths return) are harvested upward: those paths never reach the
//!   join, so their insertion points are independent of anything after
//!   the `if`.
//! - A branch that **falls through** and mentions the binding promotes
//!   the whole `if` to straight-line candidate: one release at the join
//!   covers every fall-through path exactly once, where an in-branch
//!   release could double with a later release or fire before a later
//!   use.
//! - A branch that is a single bare `return` mentioning the binding is
//!   recorded directly without recursion.
//! - Harvesting from a branch also moves an *earlier* candidate to the
//!   join: the statements before the `if` execute on the exiting paths
//!   too, so a release there would double with the harvested one.
//!
//! The result is the straight-line candidate (if any) plus every
//! harvested mention — each on a mutually exclusive path.
//!
//! Implemented as ordinary recursive functions returning structured
//! mention lists; no shared mutable scan state.

use rcx_ast::{Ast, NodeId, NodeKind, VarId};

/// One safe release-insertion point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mention {
    /// The statement carrying the mention.
    pub stmt: NodeId,
    pub kind: MentionKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MentionKind {
    /// A non-exiting statement: the release goes right after it.
    Straight,
    /// A `return` mentioning the binding. `complex` is true when the
    /// operand is not a bare identifier — those get the capture rewrite;
    /// bare-identifier returns transfer ownership and get nothing.
    Return { complex: bool },
}

impl Mention {
    pub fn is_return(&self) -> bool {
        matches!(self.kind, MentionKind::Return { .. })
    }

    pub fn is_complex_return(&self) -> bool {
        matches!(self.kind, MentionKind::Return { complex: true })
    }
}

/// Analysis result for one block: the fall-through candidate plus every
/// mention on a function-exiting path.
struct BlockMentions {
    candidate: Option<Mention>,
    exited: Vec<Mention>,
}

/// Compute the release-insertion points for `var` in `block`.
pub fn last_mentions(ast: &Ast, block: NodeId, var: VarId) -> Vec<Mention> {
    let analysis = analyze_block(ast, block, var);
    let mut out = analysis.exited;
    out.extend(analysis.candidate);
    out
}

fn analyze_block(ast: &Ast, block: NodeId, var: VarId) -> BlockMentions {
    let mut candidate: Option<Mention> = None;
    let mut exited: Vec<Mention> = Vec::new();

    for &stmt in ast.block_stmts(block) {
        let NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } = ast.kind(stmt)
        else {
            if ast.mentions_var(stmt, var) {
                candidate = Some(mention_for(ast, stmt, var));
            }
            continue;
        };
        let (cond, then_branch, else_branch) = (*cond, *then_branch, *else_branch);

        let cond_mention = ast.mentions_var(cond, var);
        let mut fallthrough_mention = false;
        let mut harvested = false;

        for branch in [Some(then_branch), else_branch].into_iter().flatten() {
            match ast.kind(branch) {
                NodeKind::Block { .. } => {
                    let sub = analyze_block(ast, branch, var);
                    if always_exits(ast, branch) {
                        harvested |= sub.candidate.is_some() || !sub.exited.is_empty();
                        exited.extend(sub.exited);
                        exited.extend(sub.candidate);
                    } else {
                        harvested |= !sub.exited.is_empty();
                        exited.extend(sub.exited);
                        if sub.candidate.is_some() {
                            fallthrough_mention = true;
                        }
                    }
                }
                NodeKind::Return { .. } if ast.mentions_var(branch, var) => {
                    exited.push(mention_for(ast, branch, var));
                    harvested = true;
                }
                _ => {
                    if ast.mentions_var(branch, var) {
                        fallthrough_mention = true;
                    }
                }
            }
        }

        if cond_mention || fallthrough_mention {
            candidate = Some(Mention {
                stmt,
                kind: MentionKind::Straight,
            });
        } else if harvested && candidate.is_some() {
            // Earlier mentions execute on the exiting paths too; their
            // release moves to the join so it cannot double-fire.
            candidate = Some(Mention {
                stmt,
                kind: MentionKind::Straight,
            });
        }
    }

    BlockMentions { candidate, exited }
}

fn mention_for(ast: &Ast, stmt: NodeId, var: VarId) -> Mention {
    debug_assert!(ast.mentions_var(stmt, var));
    let kind = match ast.kind(stmt) {
        NodeKind::Return { value } => {
            let complex =
                value.is_none_or(|operand| !matches!(ast.kind(operand), NodeKind::Ident { .. }));
            MentionKind::Return { complex }
        }
        _ => MentionKind::Straight,
    };
    Mention { stmt, kind }
}

/// Syntactic always-exits check: every path through the statement leaves
/// the enclosing function via `return`.
pub fn always_exits(ast: &Ast, stmt: NodeId) -> bool {
    match ast.kind(stmt) {
        NodeKind::Return { .. } => true,
        NodeKind::Block { stmts } => stmts.last().is_some_and(|&last| always_exits(ast, last)),
        NodeKind::If {
            then_branch,
            else_branch,
            ..
        } => match else_branch {
            Some(else_branch) => {
                always_exits(ast, *then_branch) && always_exits(ast, *else_branch)
            }
            None => false,
        },
        _ => false,
    }
}
