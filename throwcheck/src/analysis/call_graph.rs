//! Call graph construction.
//!
//! One arena-indexed node per named callable, with callee edges to other
//! named callables. Used only for scheduling: edges include calls that
//! occur inside nested closures, which over-approximates dependencies but
//! never results.

use std::collections::{HashMap, HashSet};

use throwcheck_parser::{Block, Expr, FunctionDef, Program, Stmt};

/// Arena index of a named callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub u32);

impl FuncId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the call graph.
#[derive(Debug, Clone)]
pub struct FuncNode {
    pub id: FuncId,
    pub name: String,
    /// Callees with known definitions, deduplicated.
    pub callees: Vec<FuncId>,
    pub callers: Vec<FuncId>,
}

/// Call graph over a program's named callables.
#[derive(Debug)]
pub struct CallGraph {
    nodes: Vec<FuncNode>,
    by_name: HashMap<String, FuncId>,
}

impl CallGraph {
    /// Build the graph from a parsed program. When a name is defined more
    /// than once the first definition wins, matching call resolution.
    pub fn build(program: &Program) -> Self {
        let mut nodes = Vec::new();
        let mut by_name = HashMap::new();

        for (idx, func) in program.functions.iter().enumerate() {
            let id = FuncId(idx as u32);
            let name = func
                .signature
                .name
                .clone()
                .unwrap_or_else(|| format!("<anonymous #{idx}>"));
            by_name.entry(name.clone()).or_insert(id);
            nodes.push(FuncNode { id, name, callees: Vec::new(), callers: Vec::new() });
        }

        let mut graph = Self { nodes, by_name };

        for (idx, func) in program.functions.iter().enumerate() {
            let caller = FuncId(idx as u32);
            let mut called = HashSet::new();
            if let Some(body) = &func.body {
                called_names_in_block(body, &mut called);
            }
            let mut callees: Vec<FuncId> = called
                .iter()
                .filter_map(|name| graph.by_name.get(name.as_str()).copied())
                .collect();
            callees.sort();
            for callee in &callees {
                graph.nodes[callee.index()].callers.push(caller);
            }
            graph.nodes[caller.index()].callees = callees;
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: FuncId) -> &FuncNode {
        &self.nodes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = FuncId> + '_ {
        (0..self.nodes.len()).map(|i| FuncId(i as u32))
    }

    pub fn lookup(&self, name: &str) -> Option<FuncId> {
        self.by_name.get(name).copied()
    }

    /// True if the node calls itself directly.
    pub fn is_self_recursive(&self, id: FuncId) -> bool {
        self.node(id).callees.contains(&id)
    }
}

/// Collect the names of all calls in a block, including calls made inside
/// nested closures.
fn called_names_in_block(block: &Block, out: &mut HashSet<String>) {
    for stmt in &block.stmts {
        called_names_in_stmt(stmt, out);
    }
}

fn called_names_in_stmt(stmt: &Stmt, out: &mut HashSet<String>) {
    match stmt {
        Stmt::Expr { expr, .. } => called_names_in_expr(expr, out),
        Stmt::Assign { value, .. } => called_names_in_expr(value, out),
        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                called_names_in_expr(expr, out);
            }
        }
        Stmt::If { condition, then_branch, else_branch, .. } => {
            called_names_in_expr(condition, out);
            called_names_in_block(then_branch, out);
            if let Some(block) = else_branch {
                called_names_in_block(block, out);
            }
        }
        Stmt::While { condition, body, .. } => {
            called_names_in_expr(condition, out);
            called_names_in_block(body, out);
        }
        Stmt::For { iter, body, .. } => {
            called_names_in_expr(iter, out);
            called_names_in_block(body, out);
        }
        Stmt::Try { body, catch, finally, .. } => {
            called_names_in_block(body, out);
            if let Some(catch) = catch {
                called_names_in_block(&catch.body, out);
            }
            if let Some(block) = finally {
                called_names_in_block(block, out);
            }
        }
    }
}

fn called_names_in_expr(expr: &Expr, out: &mut HashSet<String>) {
    match expr {
        Expr::Call { callee, args, .. } => {
            if let Expr::Var { name, .. } = &**callee {
                out.insert(name.clone());
            } else {
                called_names_in_expr(callee, out);
            }
            for arg in args {
                called_names_in_expr(arg, out);
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            called_names_in_expr(lhs, out);
            called_names_in_expr(rhs, out);
        }
        Expr::Unary { operand, .. } => called_names_in_expr(operand, out),
        Expr::Throw { value, .. } => called_names_in_expr(value, out),
        Expr::Closure { def, .. } => closure_called_names(def, out),
        Expr::Int { .. }
        | Expr::Float { .. }
        | Expr::Bool { .. }
        | Expr::Str { .. }
        | Expr::Var { .. }
        | Expr::Rethrow { .. } => {}
    }
}

fn closure_called_names(def: &FunctionDef, out: &mut HashSet<String>) {
    if let Some(body) = &def.body {
        called_names_in_block(body, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throwcheck_parser::parse;

    fn graph_of(source: &str) -> CallGraph {
        CallGraph::build(&parse(source).unwrap())
    }

    #[test]
    fn test_simple_edges() {
        let graph = graph_of(
            "function f()::Int\n    return 42\nend\n\
             function g()::Int\n    return f()\nend",
        );
        assert_eq!(graph.len(), 2);
        let f = graph.lookup("f").unwrap();
        let g = graph.lookup("g").unwrap();
        assert_eq!(graph.node(g).callees, vec![f]);
        assert_eq!(graph.node(f).callers, vec![g]);
    }

    #[test]
    fn test_self_recursion() {
        let graph = graph_of("function f()::Int\n    return f()\nend");
        let f = graph.lookup("f").unwrap();
        assert!(graph.is_self_recursive(f));
    }

    #[test]
    fn test_calls_inside_closures_count_for_scheduling() {
        let graph = graph_of(
            "function f()::Int\n    return 1\nend\n\
             function g()::Int\n    h = x -> f()\n    return h(0)\nend",
        );
        let f = graph.lookup("f").unwrap();
        let g = graph.lookup("g").unwrap();
        assert_eq!(graph.node(g).callees, vec![f]);
    }

    #[test]
    fn test_unknown_callee_has_no_edge() {
        let graph = graph_of("function f()::Int\n    return mystery()\nend");
        let f = graph.lookup("f").unwrap();
        assert!(graph.node(f).callees.is_empty());
    }
}
