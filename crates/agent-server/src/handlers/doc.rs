use actix_web::HttpResponse;
use serde_json::{json, Value};

/// OpenAPI 3.0 description of the `/api` routes.
pub fn openapi_document() -> Value {
    let server_config = json!({
        "type": "object",
        "required": ["url"],
        "properties": {
            "url": {"type": "string", "format": "uri", "description": "Streamable HTTP MCP endpoint"},
            "headers": {
                "type": "object",
                "additionalProperties": {"type": "string"},
                "description": "Extra headers sent with every MCP request"
            }
        }
    });

    let streamed_turn = json!({
        "description": "Text fragments as generated, then a blank line and a JSON object {\"messages\": [...]}",
        "content": {"text/event-stream": {"schema": {"type": "string"}}}
    });

    let error = json!({
        "description": "The turn could not be started",
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Error"}}}
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "MCP Chat Server",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Chat completions with human approval of MCP tool calls"
        },
        "paths": {
            "/api/chat": {
                "post": {
                    "summary": "Stream the next assistant turn",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "required": ["messages", "serverConfig"],
                            "properties": {
                                "messages": {"type": "array", "items": {"$ref": "#/components/schemas/Message"}},
                                "serverConfig": {"$ref": "#/components/schemas/ServerConfig"}
                            }
                        }}}
                    },
                    "responses": {"200": streamed_turn, "400": error, "500": error}
                }
            },
            "/api/chat/tool-call-approvals": {
                "post": {
                    "summary": "Execute approved tool calls and stream the continuation",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "required": ["messages", "serverConfig", "approvedToolCallIds"],
                            "properties": {
                                "messages": {"type": "array", "items": {"$ref": "#/components/schemas/Message"}},
                                "serverConfig": {"$ref": "#/components/schemas/ServerConfig"},
                                "approvedToolCallIds": {"type": "array", "items": {"type": "string"}}
                            }
                        }}}
                    },
                    "responses": {"200": streamed_turn, "400": error, "500": error}
                }
            },
            "/api/mcp/tools": {
                "post": {
                    "summary": "List the tools of an MCP server",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ServerConfig"}}}
                    },
                    "responses": {
                        "200": {
                            "description": "Tools keyed by name",
                            "content": {"application/json": {"schema": {
                                "type": "object",
                                "additionalProperties": {"$ref": "#/components/schemas/Tool"}
                            }}}
                        },
                        "400": error,
                        "500": error
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "ServerConfig": server_config,
                "Message": {
                    "type": "object",
                    "required": ["role", "content"],
                    "properties": {
                        "role": {"type": "string", "enum": ["system", "user", "assistant", "tool"]},
                        "content": {
                            "oneOf": [
                                {"type": "string"},
                                {"type": "array", "items": {"type": "object", "required": ["type"], "properties": {
                                    "type": {"type": "string", "enum": ["text", "tool-call", "tool-result"]}
                                }}}
                            ]
                        }
                    }
                },
                "Tool": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "inputSchema": {"type": "object"}
                    }
                },
                "Error": {
                    "type": "object",
                    "properties": {"error": {"type": "string"}}
                }
            }
        }
    })
}

pub async fn handler() -> HttpResponse {
    HttpResponse::Ok().json(openapi_document())
}
