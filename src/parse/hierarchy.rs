use crate::model::task::TaskItem;

/// Rebuild parent/child links for one document from indentation.
///
/// Takes the flat, source-ordered output of the line scanner and returns the
/// document's forest. The stack always holds a strictly increasing indent
/// chain; a task with indent equal to the stack top is its sibling, not its
/// child. Any indent step is accepted.
pub fn build_forest(flat: Vec<TaskItem>) -> Vec<TaskItem> {
    let mut roots = Vec::new();
    let mut stack: Vec<TaskItem> = Vec::new();

    for mut task in flat {
        while stack.last().is_some_and(|top| top.indent >= task.indent) {
            close_top(&mut stack, &mut roots);
        }
        task.parent_line = stack.last().map(|parent| parent.line);
        task.children.clear();
        stack.push(task);
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

/// Pop the stack top and attach it to the new top, or emit it as a root.
/// A popped task has seen every child it will ever get, so siblings land in
/// source order.
fn close_top(stack: &mut Vec<TaskItem>, roots: &mut Vec<TaskItem>) {
    let Some(done) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some(parent) => parent.children.push(done),
        None => roots.push(done),
    }
}
