mod generated;

use dbus_marshal_gen::{render_module, Artifact, Message, Result, Session, Value};
use std::collections::HashMap;
use test_log::test;

fn artifact() -> Result<Artifact> {
    let mut session = Session::new();
    for signature in ["(sii)", "a{sv}", "aai"].iter() {
        session.read_entry(signature, false)?;
        session.write_entry(signature, false)?;
    }
    Ok(session.finish())
}

#[test]
fn checked_in_module_is_current() -> Result<()> {
    assert_eq!(render_module(&artifact()?), include_str!("generated.rs"));
    Ok(())
}

#[test]
fn struct_round_trip() -> Result<()> {
    let message = generated::write_message_rsiiz(&("a".to_owned(), 1, 2))?;
    assert_eq!(message.signature, "(sii)");
    assert_eq!(
        message.data,
        vec![1, 0, 0, 0, 97, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]
    );
    assert_eq!(
        generated::read_message_rsiiz(&message)?,
        ("a".to_owned(), 1, 2)
    );
    Ok(())
}

#[test]
fn dictionary_round_trip() -> Result<()> {
    let mut map = HashMap::new();
    map.insert("k".to_owned(), Value::U32(7));
    let message = generated::write_message_aesvz(Some(&map))?;
    assert_eq!(message.signature, "a{sv}");
    assert_eq!(
        message.data,
        vec![16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 107, 0, 1, 117, 0, 0, 0, 0, 7, 0, 0, 0]
    );
    assert_eq!(generated::read_message_aesvz(&message)?, map);

    // The evaluator agrees with the compiled procedures.
    let artifact = artifact()?;
    let value = Value::dict(
        "s",
        "v",
        vec![("k".into(), Value::variant(Value::U32(7)))],
    );
    assert_eq!(
        artifact.write_message("write_message_aesvz", &[value.clone()])?,
        message
    );
    assert_eq!(
        artifact.read_message("read_message_aesvz", &message)?,
        value
    );
    Ok(())
}

#[test]
fn nested_array_round_trip() -> Result<()> {
    let values = vec![vec![1, 2], vec![], vec![3]];
    let message = generated::write_message_aai(Some(values.as_slice()))?;
    assert_eq!(
        message.data,
        vec![24, 0, 0, 0, 8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 3, 0, 0, 0]
    );
    assert_eq!(generated::read_message_aai(&message)?, values);
    Ok(())
}

#[test]
fn absent_array() -> Result<()> {
    let message = generated::write_message_aai(None)?;
    assert_eq!(message, Message::new(vec![0, 0, 0, 0], "aai"));
    assert_eq!(generated::read_message_aai(&message)?, Vec::<Vec<i32>>::new());
    Ok(())
}

#[test]
fn wrong_body_signature() -> Result<()> {
    let message = generated::write_message_aai(None)?;
    assert!(generated::read_message_aesvz(&message).is_err());
    Ok(())
}
