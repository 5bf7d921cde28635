// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! zbus transport
//!
//! Connects to the system or session bus with `zbus`. Subscriptions register
//! an `AddMatch` rule through `MessageStream::for_match_rule`; signal bodies
//! are sent as a structure of string fields so the body signature is one `s`
//! per parameter. Inbound signals carrying any other field type are dropped.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, warn};
use zbus::message::Type;
use zbus::names::BusName;
use zbus::zvariant::{Structure, StructureBuilder, Value};
use zbus::{Connection, MatchRule, Message, MessageStream};

use super::bus::{BusConnection, BusConnector, InboundStream};
use super::event::BusType;
use super::message::{InboundMessage, MessageKind, OutboundSignal, SignalMatch};
use super::DbusError;

/// Connects to the real D-Bus daemon.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZbusConnector;

#[async_trait]
impl BusConnector for ZbusConnector {
    async fn connect(&self, bus_type: BusType) -> Result<Arc<dyn BusConnection>, DbusError> {
        let connection = match bus_type {
            BusType::System => Connection::system().await?,
            BusType::Session => Connection::session().await?,
        };
        debug!("Connected to the {} bus", bus_type);
        Ok(Arc::new(ZbusConnection { connection }))
    }
}

struct ZbusConnection {
    connection: Connection,
}

#[async_trait]
impl BusConnection for ZbusConnection {
    async fn send_signal(&self, signal: &OutboundSignal) -> Result<(), DbusError> {
        let destination: Option<BusName<'_>> = None;

        if signal.body.is_empty() {
            self.connection
                .emit_signal(
                    destination,
                    signal.path.as_str(),
                    signal.interface.as_str(),
                    signal.member.as_str(),
                    &(),
                )
                .await?;
        } else {
            let body = signal
                .body
                .iter()
                .fold(StructureBuilder::new(), |builder, arg| builder.add_field(arg.as_str()))
                .build();

            self.connection
                .emit_signal(
                    destination,
                    signal.path.as_str(),
                    signal.interface.as_str(),
                    signal.member.as_str(),
                    &body,
                )
                .await?;
        }

        Ok(())
    }

    async fn subscribe(&self, rule: &SignalMatch) -> Result<InboundStream, DbusError> {
        let match_rule = MatchRule::builder()
            .msg_type(Type::Signal)
            .interface(rule.interface.as_str())?
            .path(rule.path.as_str())?
            .member(rule.member.as_str())?
            .build();

        let stream = MessageStream::for_match_rule(match_rule, &self.connection, None).await?;

        Ok(stream
            .filter_map(|message| async move {
                match message {
                    Ok(message) => to_inbound(&message),
                    Err(e) => {
                        warn!("Error reading from d-bus: {}", e);
                        None
                    }
                }
            })
            .boxed())
    }
}

fn to_inbound(message: &Message) -> Option<InboundMessage> {
    let message_type = message.message_type();
    let kind = if message_type == Type::Signal {
        MessageKind::Signal
    } else if message_type == Type::MethodCall {
        MessageKind::MethodCall
    } else if message_type == Type::MethodReturn {
        MessageKind::MethodReturn
    } else {
        MessageKind::Error
    };

    let header = message.header();
    let member = header.member().map(|m| m.to_string());
    let body = message.body();
    let (signature, args) = match body.deserialize::<Structure<'_>>() {
        Ok(structure) => {
            let fields = structure.fields();
            let signature: String = fields
                .iter()
                .map(|field| field.value_signature().as_str().to_string())
                .collect();
            match string_fields(fields) {
                Ok(args) => (signature, args),
                Err(field_signature) => {
                    warn!(
                        "Dropping signal {}: field of signature '{}' in body '{}' is not a string",
                        member.as_deref().unwrap_or("<no member>"),
                        field_signature,
                        signature
                    );
                    return None;
                }
            }
        }
        Err(e) => {
            debug!("Signal body is not a structure: {}", e);
            (String::new(), Vec::new())
        }
    };

    Some(InboundMessage {
        kind,
        interface: header.interface().map(|i| i.to_string()),
        path: header.path().map(|p| p.to_string()),
        member,
        signature,
        body: args,
    })
}

/// Body fields as strings, or the signature of the first non-string field.
fn string_fields(fields: &[Value<'_>]) -> Result<Vec<String>, String> {
    fields
        .iter()
        .map(|field| match field {
            Value::Str(s) => Ok(s.as_str().to_string()),
            other => Err(other.value_signature().as_str().to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_string_fields() {
        let fields = vec![Value::from("o-17"), Value::from("ada")];
        assert_eq!(string_fields(&fields), Ok(vec!["o-17".to_string(), "ada".to_string()]));

        let fields = vec![Value::from("o-17"), Value::U32(7)];
        assert_eq!(string_fields(&fields), Err("u".to_string()));
    }

    #[test]
    fn test_string_signal_is_converted() {
        let message = Message::signal("/acme/shop/events", "acme.shop.Events", "acme_shop_events_OrderPlaced")
            .unwrap()
            .build(&("o-17", "ada"))
            .unwrap();

        let inbound = to_inbound(&message).unwrap();
        assert_eq!(inbound.kind, MessageKind::Signal);
        assert_eq!(inbound.signature, "ss");
        assert_eq!(inbound.body, vec!["o-17".to_string(), "ada".to_string()]);
        assert_eq!(inbound.member.as_deref(), Some("acme_shop_events_OrderPlaced"));
    }

    #[test]
    #[traced_test]
    fn test_non_string_field_drops_the_signal() {
        let message = Message::signal("/acme/shop/events", "acme.shop.Events", "acme_shop_events_OrderPlaced")
            .unwrap()
            .build(&("o-17", 7u32))
            .unwrap();

        assert!(to_inbound(&message).is_none());
        assert!(logs_contain("Dropping signal acme_shop_events_OrderPlaced: field of signature 'u'"));
    }
}
