//! Typed interview-workflow graph and its engine wire format.
//!
//! The automation engine consumes a JSON document of named nodes wired by
//! per-channel connection lists. Rather than interpolating strings into a
//! template document, the graph is built as a tagged node list plus an
//! explicit edge list, and only serialized to the wire shape at the client
//! boundary.
//!
//! A graph is built fresh from a persisted form on every provisioning
//! request and is never mutated after construction: it is submitted once
//! and discarded.

use serde_json::{json, Value};

use crate::models::form::Form;

/// Node display names. These are part of the engine contract: connections
/// reference nodes by name, and the public form URL is derived from the
/// trigger node's path.
pub const TRIGGER_NODE: &str = "Start Interview";
pub const ASSIGN_NODE: &str = "Set Interview Topic";
pub const AGENT_NODE: &str = "AI Researcher";
pub const MEMORY_NODE: &str = "Window Buffer Memory";
pub const BRANCH_NODE: &str = "Stop Interview?";
pub const ANSWER_NODE: &str = "Get Answer";
pub const COMPLETION_NODE: &str = "Show Completion";

const DEFAULT_FORM_DESCRIPTION: &str = "Thanks for taking part in our Interview. You will be presented with an unending series of questions to help us with our research.

The interviewer is an AI agent and the questions are dynamically generated. When you're done answering, simply say STOP to exit the interview.";

/// The fixed node kinds of an interview workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Public form trigger, the entry webhook respondents hit first.
    FormTrigger {
        form_title: String,
        form_description: String,
        field_label: String,
        path: String,
    },
    /// Seeds the `answer` greeting and the `interview_topic` variable.
    Assign {
        initial_question: String,
        interview_topic: String,
    },
    /// Conversational AI agent driving the interview.
    Agent { system_message: String },
    /// Session-scoped conversation memory (side channel into the agent).
    Memory {
        session_key: String,
        context_window: u32,
    },
    /// Boolean branch on the agent's `stop_interview` output.
    Branch,
    /// Follow-up question page shown between turns.
    AnswerPrompt,
    /// Terminal completion screen.
    Completion,
}

/// A single node: identity, canvas position, and kind-specific parameters.
#[derive(Debug, Clone)]
pub struct WorkflowNode {
    pub id: String,
    pub name: String,
    pub position: (i64, i64),
    pub webhook_id: Option<String>,
    pub kind: NodeKind,
}

/// Connection channel between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Main,
    AiMemory,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::AiMemory => "ai_memory",
        }
    }
}

/// A directed edge. `output` selects the source node's output slot; the
/// branch node exposes slot 0 (condition true) and slot 1 (condition false).
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: &'static str,
    pub to: &'static str,
    pub channel: Channel,
    pub output: usize,
}

impl Edge {
    fn main(from: &'static str, to: &'static str) -> Self {
        Self {
            from,
            to,
            channel: Channel::Main,
            output: 0,
        }
    }
}

/// A named interview workflow graph.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<Edge>,
}

impl WorkflowGraph {
    /// Build the interview pipeline for a persisted form.
    ///
    /// Topology: trigger → assign → agent; memory → agent (ai_memory);
    /// agent → branch; branch true → completion; branch false → follow-up
    /// prompt → agent (loop).
    pub fn interview(form: &Form) -> Self {
        let webhook_id = format!("form-{}", form.id);
        let webhook_path = format!("interview-{}", form.id);
        let form_title = form.title().to_string();
        let form_description = form
            .form_description
            .clone()
            .unwrap_or_else(|| DEFAULT_FORM_DESCRIPTION.to_string());
        // Session key combines the respondent's first answer with a
        // minute-truncated timestamp, evaluated by the engine at runtime.
        let session_key = format!(
            "={{{{ $('{trigger}').first().json['{q}'] }}}}-{{{{ $now.format('yyyy-MM-dd-HH-mm') }}}}",
            trigger = TRIGGER_NODE,
            q = form.initial_question,
        );

        let nodes = vec![
            WorkflowNode {
                id: "start-interview".to_string(),
                name: TRIGGER_NODE.to_string(),
                position: (-740, -220),
                webhook_id: Some(webhook_id.clone()),
                kind: NodeKind::FormTrigger {
                    form_title,
                    form_description,
                    field_label: form.initial_question.clone(),
                    path: webhook_path,
                },
            },
            WorkflowNode {
                id: "set-interview-topic".to_string(),
                name: ASSIGN_NODE.to_string(),
                position: (-360, -220),
                webhook_id: None,
                kind: NodeKind::Assign {
                    initial_question: form.initial_question.clone(),
                    interview_topic: form.interview_topic.clone(),
                },
            },
            WorkflowNode {
                id: "ai-researcher".to_string(),
                name: AGENT_NODE.to_string(),
                position: (40, -160),
                webhook_id: None,
                kind: NodeKind::Agent {
                    system_message: form.system_prompt.clone(),
                },
            },
            WorkflowNode {
                id: "window-buffer-memory".to_string(),
                name: MEMORY_NODE.to_string(),
                position: (100, 40),
                webhook_id: None,
                kind: NodeKind::Memory {
                    session_key,
                    context_window: 15,
                },
            },
            WorkflowNode {
                id: "stop-interview".to_string(),
                name: BRANCH_NODE.to_string(),
                position: (500, -160),
                webhook_id: None,
                kind: NodeKind::Branch,
            },
            WorkflowNode {
                id: "get-answer".to_string(),
                name: ANSWER_NODE.to_string(),
                position: (840, 220),
                webhook_id: Some(format!("{}-answer", webhook_id)),
                kind: NodeKind::AnswerPrompt,
            },
            WorkflowNode {
                id: "show-completion".to_string(),
                name: COMPLETION_NODE.to_string(),
                position: (1480, -420),
                webhook_id: Some(format!("{}-completion", webhook_id)),
                kind: NodeKind::Completion,
            },
        ];

        let edges = vec![
            Edge::main(TRIGGER_NODE, ASSIGN_NODE),
            Edge::main(ASSIGN_NODE, AGENT_NODE),
            Edge {
                from: MEMORY_NODE,
                to: AGENT_NODE,
                channel: Channel::AiMemory,
                output: 0,
            },
            Edge::main(AGENT_NODE, BRANCH_NODE),
            Edge {
                from: BRANCH_NODE,
                to: COMPLETION_NODE,
                channel: Channel::Main,
                output: 0,
            },
            Edge {
                from: BRANCH_NODE,
                to: ANSWER_NODE,
                channel: Channel::Main,
                output: 1,
            },
            Edge::main(ANSWER_NODE, AGENT_NODE),
        ];

        Self {
            name: format!("{} - Interview Form", form.name),
            nodes,
            edges,
        }
    }

    /// The trigger's public webhook path, when the graph has one.
    pub fn webhook_path(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::FormTrigger { path, .. } if n.name == TRIGGER_NODE => Some(path.as_str()),
            _ => None,
        })
    }

    /// Serialize nodes and connections to the engine wire format.
    pub fn to_wire(&self) -> Value {
        json!({
            "nodes": self.nodes.iter().map(node_to_wire).collect::<Vec<_>>(),
            "connections": self.connections_to_wire(),
        })
    }

    /// Connections are grouped per source node, then per channel, as a list
    /// of target lists indexed by the source's output slot.
    fn connections_to_wire(&self) -> Value {
        let mut out = serde_json::Map::new();
        for node in &self.nodes {
            let outgoing: Vec<&Edge> = self.edges.iter().filter(|e| e.from == node.name).collect();
            if outgoing.is_empty() {
                continue;
            }
            let mut channels = serde_json::Map::new();
            for channel in [Channel::Main, Channel::AiMemory] {
                let on_channel: Vec<&&Edge> =
                    outgoing.iter().filter(|e| e.channel == channel).collect();
                if on_channel.is_empty() {
                    continue;
                }
                let slots = on_channel.iter().map(|e| e.output).max().unwrap_or(0) + 1;
                let mut lists: Vec<Vec<Value>> = vec![Vec::new(); slots];
                for edge in on_channel {
                    lists[edge.output].push(json!({
                        "node": edge.to,
                        "type": channel.as_str(),
                        "index": 0,
                    }));
                }
                channels.insert(channel.as_str().to_string(), json!(lists));
            }
            out.insert(node.name.clone(), Value::Object(channels));
        }
        Value::Object(out)
    }
}

fn node_to_wire(node: &WorkflowNode) -> Value {
    let (node_type, type_version, parameters) = match &node.kind {
        NodeKind::FormTrigger {
            form_title,
            form_description,
            field_label,
            path,
        } => (
            "n8n-nodes-base.formTrigger",
            json!(2.2),
            json!({
                "formTitle": form_title,
                "formDescription": form_description,
                "formFields": {
                    "values": [{
                        "fieldLabel": field_label,
                        "placeholder": "ie. Sam Smith",
                        "requiredField": true,
                    }],
                },
                "responseMode": "lastNode",
                "options": {
                    "appendAttribution": true,
                    "buttonLabel": "Begin Interview!",
                    "path": path,
                    "ignoreBots": true,
                    "useWorkflowTimezone": true,
                },
            }),
        ),
        NodeKind::Assign {
            initial_question,
            interview_topic,
        } => (
            "n8n-nodes-base.set",
            json!(3.4),
            json!({
                "assignments": {
                    "assignments": [
                        {
                            "id": "answer-1",
                            "name": "answer",
                            "value": format!("=Hello, my name is {{{{ $json['{}'] }}}}", initial_question),
                            "type": "string",
                        },
                        {
                            "id": "topic-1",
                            "name": "interview_topic",
                            "value": interview_topic,
                            "type": "string",
                        },
                    ],
                },
                "options": {},
            }),
        ),
        NodeKind::Agent { system_message } => (
            "@n8n/n8n-nodes-langchain.agent",
            json!(1.7),
            json!({
                "promptType": "define",
                "text": "={{ $json.answer }}",
                "options": {
                    "systemMessage": system_message,
                },
            }),
        ),
        NodeKind::Memory {
            session_key,
            context_window,
        } => (
            "@n8n/n8n-nodes-langchain.memoryBufferWindow",
            json!(1.3),
            json!({
                "sessionIdType": "customKey",
                "sessionKey": session_key,
                "contextWindowLength": context_window,
            }),
        ),
        NodeKind::Branch => (
            "n8n-nodes-base.if",
            json!(2.2),
            json!({
                "conditions": {
                    "options": {
                        "caseSensitive": true,
                        "leftValue": "",
                        "typeValidation": "strict",
                        "version": 2,
                    },
                    "conditions": [{
                        "id": "stop-condition",
                        "leftValue": "={{ $json.output.stop_interview }}",
                        "rightValue": "",
                        "operator": {
                            "type": "boolean",
                            "operation": "true",
                            "singleValue": true,
                        },
                    }],
                    "combinator": "and",
                },
                "options": {},
            }),
        ),
        NodeKind::AnswerPrompt => (
            "n8n-nodes-base.form",
            json!(1),
            json!({
                "formFields": {
                    "values": [{
                        "fieldLabel": "answer",
                        "fieldType": "textarea",
                        "requiredField": true,
                    }],
                },
                "options": {
                    "formTitle": "={{ $json.output.question }}",
                    "formDescription": "Please answer the question or type \"stop interview\" to end the interview.",
                    "buttonLabel": "Next Question",
                },
            }),
        ),
        NodeKind::Completion => (
            "n8n-nodes-base.form",
            json!(1),
            json!({
                "operation": "completion",
                "completionTitle": "Thanks for Completing the Interview!",
                "completionMessage": "Your answers have been recorded and we'll be in touch soon!",
                "options": {},
            }),
        ),
    };

    let mut wire = json!({
        "parameters": parameters,
        "type": node_type,
        "typeVersion": type_version,
        "position": [node.position.0, node.position.1],
        "id": node.id,
        "name": node.name,
    });
    if let Some(webhook_id) = &node.webhook_id {
        wire["webhookId"] = json!(webhook_id);
    }
    wire
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_form(id: &str) -> Form {
        Form::new(
            id.to_string(),
            "p1".to_string(),
            "UX".to_string(),
            "mobile app".to_string(),
            "You are an interviewer.".to_string(),
            "Your name?".to_string(),
            Some("UX".to_string()),
            None,
        )
    }

    fn kind_tag(kind: &NodeKind) -> &'static str {
        match kind {
            NodeKind::FormTrigger { .. } => "trigger",
            NodeKind::Assign { .. } => "assign",
            NodeKind::Agent { .. } => "agent",
            NodeKind::Memory { .. } => "memory",
            NodeKind::Branch => "branch",
            NodeKind::AnswerPrompt => "answer",
            NodeKind::Completion => "completion",
        }
    }

    #[test]
    fn test_graph_has_one_node_of_each_kind() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        let mut tags: Vec<&str> = graph.nodes.iter().map(|n| kind_tag(&n.kind)).collect();
        tags.sort();
        assert_eq!(
            tags,
            vec!["agent", "answer", "assign", "branch", "completion", "memory", "trigger"]
        );
    }

    #[test]
    fn test_workflow_name_derived_from_form_name() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        assert_eq!(graph.name, "UX - Interview Form");
    }

    #[test]
    fn test_webhook_path_unique_per_form() {
        let a = WorkflowGraph::interview(&test_form("f1"));
        let b = WorkflowGraph::interview(&test_form("f2"));
        assert_eq!(a.webhook_path(), Some("interview-f1"));
        assert_eq!(b.webhook_path(), Some("interview-f2"));
        assert_ne!(a.webhook_path(), b.webhook_path());
    }

    #[test]
    fn test_branch_outputs_target_completion_then_follow_up() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        let wire = graph.to_wire();
        let branch = &wire["connections"][BRANCH_NODE]["main"];
        assert_eq!(branch.as_array().unwrap().len(), 2);
        assert_eq!(branch[0][0]["node"], COMPLETION_NODE);
        assert_eq!(branch[1][0]["node"], ANSWER_NODE);
    }

    #[test]
    fn test_memory_feeds_agent_on_ai_memory_channel() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        let wire = graph.to_wire();
        let memory = &wire["connections"][MEMORY_NODE]["ai_memory"];
        assert_eq!(memory[0][0]["node"], AGENT_NODE);
        assert_eq!(memory[0][0]["type"], "ai_memory");
    }

    #[test]
    fn test_follow_up_loops_back_to_agent() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        let wire = graph.to_wire();
        assert_eq!(wire["connections"][ANSWER_NODE]["main"][0][0]["node"], AGENT_NODE);
    }

    #[test]
    fn test_wire_nodes_carry_engine_types() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        let wire = graph.to_wire();
        let nodes = wire["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 7);

        let trigger = nodes
            .iter()
            .find(|n| n["name"] == TRIGGER_NODE)
            .expect("trigger node");
        assert_eq!(trigger["type"], "n8n-nodes-base.formTrigger");
        assert_eq!(trigger["parameters"]["options"]["path"], "interview-f1");
        assert_eq!(trigger["parameters"]["formTitle"], "UX");
        assert_eq!(trigger["parameters"]["formFields"]["values"][0]["fieldLabel"], "Your name?");
        assert_eq!(trigger["webhookId"], "form-f1");

        let agent = nodes.iter().find(|n| n["name"] == AGENT_NODE).unwrap();
        assert_eq!(
            agent["parameters"]["options"]["systemMessage"],
            "You are an interviewer."
        );

        let memory = nodes.iter().find(|n| n["name"] == MEMORY_NODE).unwrap();
        assert_eq!(
            memory["parameters"]["sessionKey"],
            "={{ $('Start Interview').first().json['Your name?'] }}-{{ $now.format('yyyy-MM-dd-HH-mm') }}"
        );
        assert_eq!(memory["parameters"]["contextWindowLength"], 15);
    }

    #[test]
    fn test_assign_seeds_topic_and_greeting() {
        let graph = WorkflowGraph::interview(&test_form("f1"));
        let wire = graph.to_wire();
        let assign = wire["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["name"] == ASSIGN_NODE)
            .unwrap()
            .clone();
        let assignments = &assign["parameters"]["assignments"]["assignments"];
        assert_eq!(assignments[0]["name"], "answer");
        assert_eq!(
            assignments[0]["value"],
            "=Hello, my name is {{ $json['Your name?'] }}"
        );
        assert_eq!(assignments[1]["name"], "interview_topic");
        assert_eq!(assignments[1]["value"], "mobile app");
    }
}
