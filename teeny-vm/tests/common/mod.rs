//! Hand-assembles class files for the end-to-end tests in this directory.
//! No `javac` is available in this environment, so every fixture is built
//! byte-for-byte against JVMS §4's layout.

use teeny_class_file::ClassFile;

const MAGIC: u32 = 0xCAFE_BABE;

enum Entry {
    Utf8(&'static str),
    Integer(i32),
    Class { name_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    Methodref { class_index: u16, name_and_type_index: u16 },
}

pub struct MethodDef {
    pub name_index: u16,
    pub descriptor_index: u16,
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

/// Builds a single-class `.class` file byte buffer with an arbitrary
/// constant pool and method table. Constant pool entries are 1-indexed in
/// the order they're pushed, matching JVMS indexing.
#[derive(Default)]
pub struct ClassBuilder {
    entries: Vec<Entry>,
    methods: Vec<MethodDef>,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a Utf8 constant, returning its 1-based pool index.
    pub fn utf8(&mut self, value: &'static str) -> u16 {
        self.entries.push(Entry::Utf8(value));
        self.entries.len() as u16
    }

    /// Pushes an Integer constant, returning its 1-based pool index.
    pub fn integer(&mut self, value: i32) -> u16 {
        self.entries.push(Entry::Integer(value));
        self.entries.len() as u16
    }

    pub fn class(&mut self, name_index: u16) -> u16 {
        self.entries.push(Entry::Class { name_index });
        self.entries.len() as u16
    }

    pub fn name_and_type(&mut self, name_index: u16, descriptor_index: u16) -> u16 {
        self.entries.push(Entry::NameAndType {
            name_index,
            descriptor_index,
        });
        self.entries.len() as u16
    }

    pub fn methodref(&mut self, class_index: u16, name_and_type_index: u16) -> u16 {
        self.entries.push(Entry::Methodref {
            class_index,
            name_and_type_index,
        });
        self.entries.len() as u16
    }

    /// Adds a Methodref (plus the Class/NameAndType entries it needs) for a
    /// same-class static call, returning the Methodref's pool index for use
    /// as `invokestatic`'s operand.
    pub fn self_methodref(&mut self, class_name: u16, name: u16, descriptor: u16) -> u16 {
        let class_index = self.class(class_name);
        let nat_index = self.name_and_type(name, descriptor);
        self.methodref(class_index, nat_index)
    }

    pub fn method(&mut self, def: MethodDef) {
        self.methods.push(def);
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&52u16.to_be_bytes());

        bytes.extend_from_slice(&((self.entries.len() + 1) as u16).to_be_bytes());
        for entry in &self.entries {
            match entry {
                Entry::Utf8(s) => {
                    bytes.push(1);
                    bytes.extend_from_slice(&(s.len() as u16).to_be_bytes());
                    bytes.extend_from_slice(s.as_bytes());
                }
                Entry::Integer(v) => {
                    bytes.push(3);
                    bytes.extend_from_slice(&v.to_be_bytes());
                }
                Entry::Class { name_index } => {
                    bytes.push(7);
                    bytes.extend_from_slice(&name_index.to_be_bytes());
                }
                Entry::NameAndType {
                    name_index,
                    descriptor_index,
                } => {
                    bytes.push(12);
                    bytes.extend_from_slice(&name_index.to_be_bytes());
                    bytes.extend_from_slice(&descriptor_index.to_be_bytes());
                }
                Entry::Methodref {
                    class_index,
                    name_and_type_index,
                } => {
                    bytes.push(10);
                    bytes.extend_from_slice(&class_index.to_be_bytes());
                    bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
                }
            }
        }

        bytes.extend_from_slice(&0u16.to_be_bytes()); // access_flags
        bytes.extend_from_slice(&0u16.to_be_bytes()); // this_class
        bytes.extend_from_slice(&0u16.to_be_bytes()); // super_class
        bytes.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count
        bytes.extend_from_slice(&0u16.to_be_bytes()); // fields_count

        bytes.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for m in &self.methods {
            bytes.extend_from_slice(&0u16.to_be_bytes()); // access_flags
            bytes.extend_from_slice(&m.name_index.to_be_bytes());
            bytes.extend_from_slice(&m.descriptor_index.to_be_bytes());
            bytes.extend_from_slice(&1u16.to_be_bytes()); // attributes_count

            // "Code" is always the first Utf8 constant pushed by the
            // fixture helpers below, at index 1.
            bytes.extend_from_slice(&1u16.to_be_bytes());
            let mut code_attr = Vec::new();
            code_attr.extend_from_slice(&m.max_stack.to_be_bytes());
            code_attr.extend_from_slice(&m.max_locals.to_be_bytes());
            code_attr.extend_from_slice(&(m.code.len() as u32).to_be_bytes());
            code_attr.extend_from_slice(&m.code);
            code_attr.extend_from_slice(&0u16.to_be_bytes());
            code_attr.extend_from_slice(&0u16.to_be_bytes());
            bytes.extend_from_slice(&(code_attr.len() as u32).to_be_bytes());
            bytes.extend_from_slice(&code_attr);
        }

        bytes.extend_from_slice(&0u16.to_be_bytes()); // class attributes_count
        bytes
    }
}

/// A `ClassBuilder` pre-seeded with the `"Code"` Utf8 constant at index 1,
/// as every `method()` call above assumes.
pub fn new_builder() -> ClassBuilder {
    let mut b = ClassBuilder::new();
    let code_index = b.utf8("Code");
    assert_eq!(code_index, 1);
    b
}

pub fn parse(bytes: Vec<u8>) -> ClassFile {
    ClassFile::parse(&mut std::io::Cursor::new(bytes)).expect("fixture should parse")
}

/// Runs `name+descriptor` in `class` to completion with fresh locals and a
/// fresh heap, returning its result and whatever it printed.
pub fn execute_method(
    class: &ClassFile,
    name: &str,
    descriptor: &str,
) -> (teeny_vm::Result<Option<i32>>, String) {
    let method = class
        .find_method(name, descriptor)
        .expect("method should exist");
    let code = method.code.as_ref().expect("method should have Code");
    let locals = vec![0i32; code.max_locals as usize];
    let mut heap = teeny_vm::Heap::new();
    let mut out = Vec::new();
    let result = teeny_vm::execute(method, locals, class, &mut heap, &mut out);
    (result, String::from_utf8(out).expect("output should be UTF-8"))
}
