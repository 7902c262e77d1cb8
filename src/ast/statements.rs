use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

use super::{
    ast::NodeId,
    types::{FunctionSignature, TypeInfo},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Root,
    Code,
    If,
    Function,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Root => "root",
            BlockType::Code => "code",
            BlockType::If => "if",
            BlockType::Function => "function",
        }
    }
}

/// A lexical scope and its ordered statements.
///
/// The three maps hold what was declared directly in this block.
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub block_type: BlockType,
    pub children: Vec<NodeId>,
    pub variables: HashMap<String, NodeId>,
    pub functions: HashMap<String, NodeId>,
    pub types: HashSet<String>,
}

impl BlockNode {
    pub fn new(block_type: BlockType) -> Self {
        BlockNode {
            block_type,
            children: vec![],
            variables: HashMap::new(),
            functions: HashMap::new(),
            types: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationNode {
    pub identifier: String,
    pub type_info: TypeInfo,
    pub init: Option<NodeId>,
}

impl DeclarationNode {
    pub fn new(identifier: String, type_info: TypeInfo) -> Self {
        DeclarationNode {
            identifier,
            type_info,
            init: None,
        }
    }
}

/// `if` with an optional else chain. `failure` is a Block or another Branch.
#[derive(Debug, Clone, Default)]
pub struct BranchNode {
    pub condition: Option<NodeId>,
    pub success: Option<NodeId>,
    pub failure: Option<NodeId>,
}

/// Both `for` and `while`; a `while` only fills `condition` and `code`.
#[derive(Debug, Clone, Default)]
pub struct LoopNode {
    pub init: Option<NodeId>,
    pub condition: Option<NodeId>,
    pub update: Option<NodeId>,
    pub code: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ReturnNode {
    pub value: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub identifier: Option<String>,
    pub signature: FunctionSignature,
    pub foreign: bool,
    pub code: Option<NodeId>,
}

impl FunctionNode {
    pub fn new(identifier: Option<String>, signature: FunctionSignature, foreign: bool) -> Self {
        FunctionNode {
            identifier,
            signature,
            foreign,
            code: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: String,
    pub inherits: Vec<String>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorNode {
    pub signature: FunctionSignature,
    pub visibility: Visibility,
    pub foreign: bool,
    pub code: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MethodNode {
    pub function: FunctionNode,
    pub visibility: Visibility,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct MemberNode {
    pub declaration: DeclarationNode,
    pub visibility: Visibility,
    pub is_static: bool,
}
