#[cfg(feature = "mutli-thread")]
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use xmpdom::{SharedMeta, XmpMeta, XmpValue};

    const XML: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:xmp="http://ns.adobe.com/xap/1.0/"
         xmlns:dc="http://purl.org/dc/elements/1.1/">
  <rdf:Description rdf:about=""
                   xmp:CreatorTool="TestApp"
                   dc:format="image/jpeg"/>
</rdf:RDF>
<?xpacket end="w"?>"#;

    #[test]
    fn test_concurrent_reads() {
        let meta = Arc::new(XmpMeta::parse(XML).unwrap());

        let mut handles = vec![];

        // Spawn 10 threads that all read concurrently
        for i in 0..10 {
            let meta_clone = meta.clone();
            let handle = thread::spawn(move || {
                if i % 2 == 0 {
                    let value = meta_clone.get_property("xmp:CreatorTool").unwrap();
                    assert_eq!(value, Some(XmpValue::String("TestApp".to_string())));
                } else {
                    let value = meta_clone.get_property("dc:format").unwrap();
                    assert_eq!(value, Some(XmpValue::String("image/jpeg".to_string())));
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_shared_writes() {
        let shared = SharedMeta::new(XmpMeta::parse(XML).unwrap());

        let mut handles = vec![];
        for i in 0..8 {
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                shared
                    .write(|meta| {
                        meta.append_array_item(
                            "dc:subject",
                            xmpdom::ArrayType::Unordered,
                            format!("tag{}", i),
                        )
                    })
                    .unwrap()
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let count = shared
            .read(|meta| meta.count_array_items("dc:subject"))
            .unwrap()
            .unwrap();
        assert_eq!(count, 8);

        let snapshot = shared.snapshot().unwrap();
        let packet = snapshot.serialize_packet().unwrap();
        assert!(packet.contains("tag7"));
    }

    #[test]
    fn test_meta_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XmpMeta>();
        assert_send_sync::<SharedMeta>();
    }
}
