//! Read-only entity hierarchy used to turn a click into a [`Scope`].
//!
//! The tree is fetched by a data collaborator as `{ "root": <node> }` and is
//! never mutated here.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::codec::parse_id;
use crate::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Root,
    Deal,
    So,
    Po,
    Contract,
}

/// Node ids arrive either as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(i64),
    Text(String),
}

impl NodeId {
    /// Integer value, using the same rules as URL ids.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NodeId::Number(n) => Some(*n),
            NodeId::Text(s) => parse_id(s),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{n}"),
            NodeId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTreeNode {
    pub kind: EntityKind,
    pub id: NodeId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<EntityTreeNode>>,
}

impl EntityTreeNode {
    pub fn children(&self) -> &[EntityTreeNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Id of the entity itself; `entity_id` wins over the display node id.
    fn leaf_id(&self) -> &NodeId {
        self.entity_id.as_ref().unwrap_or(&self.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("invalid entity tree payload: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTree {
    pub root: EntityTreeNode,
}

impl EntityTree {
    pub fn from_json(payload: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// First node (depth-first) that represents `scope`.
    pub fn find(&self, scope: &Scope) -> Option<&EntityTreeNode> {
        let mut path = Vec::new();
        if path_to(&self.root, scope, &mut path) {
            path.pop()
        } else {
            None
        }
    }

    /// Labels from the root down to the node representing `scope`.
    pub fn breadcrumb(&self, scope: &Scope) -> Vec<&str> {
        let mut path = Vec::new();
        if !path_to(&self.root, scope, &mut path) {
            return Vec::new();
        }
        path.into_iter().map(|node| node.label.as_str()).collect()
    }
}

/// Scope selected by clicking `node`.
///
/// `None` when the node lacks the ids its kind needs.
pub fn scope_for_node(node: &EntityTreeNode) -> Option<Scope> {
    match node.kind {
        EntityKind::Root => Some(Scope::All),
        EntityKind::Deal => Some(Scope::Deal {
            deal_id: node.deal_id.or_else(|| node.leaf_id().as_integer())?,
        }),
        EntityKind::So => Some(Scope::So {
            deal_id: node.deal_id?,
            so_id: node.leaf_id().as_integer()?,
        }),
        EntityKind::Po => Some(Scope::Po {
            deal_id: node.deal_id?,
            po_id: node.leaf_id().as_integer()?,
        }),
        EntityKind::Contract => Scope::contract(node.deal_id?, node.leaf_id().to_string()).ok(),
    }
}

fn path_to<'a>(
    node: &'a EntityTreeNode,
    scope: &Scope,
    path: &mut Vec<&'a EntityTreeNode>,
) -> bool {
    path.push(node);
    if scope_for_node(node).as_ref() == Some(scope) {
        return true;
    }
    for child in node.children() {
        if path_to(child, scope, path) {
            return true;
        }
    }
    path.pop();
    false
}
