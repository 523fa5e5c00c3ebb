//! Objects that know their own handle.
//!
//! A pooled object only ever sees `&self`, so it cannot compute its own
//! handle. This example shows the two mechanisms the pool offers for
//! self-registration: the [`HandleAware`] capability, where the pool hands
//! each new object its handle right after construction, and
//! [`StampedPool::handle_by_ptr`], which recovers a handle from an object
//! pointer after the fact.

use stamped_pool::{Handle, HandleAware, StampedPool};

struct Node {
    name: String,
    own_handle: Handle<Node>,
    children: Vec<Handle<Node>>,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            own_handle: Handle::default(),
            children: Vec::new(),
        }
    }
}

impl HandleAware for Node {
    fn bind_handle(&mut self, handle: Handle<Self>) {
        self.own_handle = handle;
    }
}

fn main() {
    let mut pool = StampedPool::<Node>::with_capacity(2);

    // Each node receives its own handle at construction time.
    let root = pool.spawn_aware(Node::new("root"));
    let left = pool.spawn_aware(Node::new("left"));
    let right = pool.spawn_aware(Node::new("right"));

    // The nodes can now be wired up through the handles they carry.
    let left_handle = pool[left].own_handle;
    let right_handle = pool[right].own_handle;
    pool[root].children.push(left_handle);
    pool[root].children.push(right_handle);

    println!("{} has {} children", pool[root].name, pool[root].children.len());

    let children = pool[root].children.clone();
    for child in children {
        println!("  child: {}", pool[child].name);
    }

    // Pointer recovery agrees with the bound handles, even though the pool
    // has grown and relocated its storage since the first spawn.
    for (handle, node) in &pool {
        let recovered = pool.handle_by_ptr(std::ptr::from_ref(node));
        assert_eq!(recovered, handle);
        assert_eq!(node.own_handle, handle);
    }

    println!("Every node agrees about its own identity");
}
