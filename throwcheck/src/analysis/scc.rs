//! Strongly connected components of the call graph.
//!
//! Tarjan's algorithm with an explicit work stack; node state lives in
//! index-addressed arrays, so component size is bounded by memory rather
//! than the thread stack. Components come out dependency-first: every
//! component is emitted after the components it calls into.

use super::call_graph::{CallGraph, FuncId};

/// Detect SCCs, returned dependency-first (callees before callers).
pub fn strongly_connected_components(graph: &CallGraph) -> Vec<Vec<FuncId>> {
    let n = graph.len();
    let mut index: Vec<Option<u32>> = vec![None; n];
    let mut lowlink: Vec<u32> = vec![0; n];
    let mut on_stack: Vec<bool> = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index: u32 = 0;
    let mut sccs: Vec<Vec<FuncId>> = Vec::new();

    // (node, next callee to visit); replaces the recursive strongconnect.
    let mut work: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        work.push((root, 0));

        while let Some((v, child)) = work.pop() {
            if child == 0 {
                index[v] = Some(next_index);
                lowlink[v] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            let callees = &graph.node(FuncId(v as u32)).callees;
            if child < callees.len() {
                let w = callees[child].index();
                work.push((v, child + 1));
                if index[w].is_none() {
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w].unwrap());
                }
                continue;
            }

            // All callees visited: maybe emit a component, then fold the
            // lowlink into the parent frame.
            if lowlink[v] == index[v].unwrap() {
                let mut scc = Vec::new();
                loop {
                    let w = stack.pop().unwrap();
                    on_stack[w] = false;
                    scc.push(FuncId(w as u32));
                    if w == v {
                        break;
                    }
                }
                scc.reverse();
                sccs.push(scc);
            }
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
        }
    }

    sccs
}

/// True if the component needs fixed-point iteration: more than one member,
/// or a single member that calls itself.
pub fn is_recursive_component(scc: &[FuncId], graph: &CallGraph) -> bool {
    scc.len() > 1 || (scc.len() == 1 && graph.is_self_recursive(scc[0]))
}
