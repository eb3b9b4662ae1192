use crate::tree::{NodeId, NodeKind, Tree};

/// Write the whole tree back to XML text.
///
/// Output is assembled from the pieces kept at parse time, so any markup
/// that was not edited comes back exactly as it was read.
pub fn serialize(tree: &Tree) -> String {
    Serializer::new(tree).serialize()
}

pub struct Serializer<'a> {
    tree: &'a Tree,
}

impl<'a> Serializer<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    pub fn serialize(&self) -> String {
        let mut output = String::new();
        self.write_node(self.tree.document(), &mut output);
        output
    }

    /// Serialize one node and everything below it
    pub fn serialize_node(&self, id: NodeId) -> String {
        let mut output = String::new();
        self.write_node(id, &mut output);
        output
    }

    // Iterative walk: nesting depth is bounded by the heap, not the call stack.
    fn write_node(&self, id: NodeId, output: &mut String) {
        let mut stack = vec![Step::Enter(id)];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Enter(id) => id,
                Step::Close(id) => {
                    if let Some(element) = self.tree.get(id).and_then(|n| n.as_element()) {
                        output.push_str(&element.end_tag);
                    }
                    continue;
                }
            };
            let Some(node) = self.tree.get(id) else {
                continue;
            };

            match node.kind() {
                NodeKind::Document => self.push_children(id, &mut stack),
                NodeKind::Element(element) => {
                    element.write_start_tag(output);
                    if !element.is_self_closing() {
                        stack.push(Step::Close(id));
                        self.push_children(id, &mut stack);
                    }
                }
                NodeKind::Text(raw)
                | NodeKind::CData(raw)
                | NodeKind::Comment(raw)
                | NodeKind::Declaration(raw)
                | NodeKind::ProcessingInstruction(raw)
                | NodeKind::DocType(raw) => output.push_str(raw),
            }
        }
    }

    fn push_children(&self, id: NodeId, stack: &mut Vec<Step>) {
        stack.extend(self.tree.children(id).iter().rev().map(|&child| Step::Enter(child)));
    }
}

enum Step {
    Enter(NodeId),
    Close(NodeId),
}
