//! List item handler that marks task items with a CSS class.

use std::io;

use crate::ast::{Node, NodeKind};
use crate::html::{LIST_ITEM_ATTRIBUTES, write_attributes};
use crate::renderer::{NodeHandler, RenderContext, WalkStatus};

/// Renders `<li>` elements, adding `class="task-list-item"` when the item
/// starts with a checkbox.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskListItemHandler;

/// Whether the item's first grandchild is a task checkbox.
#[must_use]
pub fn is_task_item(item: &Node) -> bool {
    item.first_child()
        .and_then(Node::first_child)
        .is_some_and(|marker| marker.kind() == NodeKind::TaskCheckBox)
}

impl NodeHandler for TaskListItemHandler {
    fn kinds(&self) -> &[NodeKind] {
        &[NodeKind::ListItem]
    }

    fn render<'a>(
        &self,
        ctx: &mut RenderContext<'a>,
        node: &'a Node,
        entering: bool,
    ) -> io::Result<WalkStatus> {
        if !entering {
            ctx.write_str("</li>\n")?;
            return Ok(WalkStatus::Continue);
        }

        ctx.write_str("<li")?;
        if is_task_item(node) {
            ctx.write_str(" class=\"task-list-item\"")?;
        }
        write_attributes(ctx, node, LIST_ITEM_ATTRIBUTES)?;
        ctx.write_str(">")?;
        if node
            .first_child()
            .is_some_and(|child| child.kind() != NodeKind::TextBlock)
        {
            ctx.write_str("\n")?;
        }
        Ok(WalkStatus::Continue)
    }
}
