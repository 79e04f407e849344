//! Common Thrift sources for tests.

// Single declarations
pub const SIMPLE_STRUCT: &str = "struct User {\n  1: string name\n}\n";
pub const SIMPLE_ENUM: &str = "enum Color {\n  RED = 1,\n  GREEN = 2\n}\n";
pub const SIMPLE_TYPEDEF: &str = "typedef i64 UserId\n";

/// The struct occupies lines 2..=5 behind a namespace header and a blank line
pub const STRUCT_AND_SERVICE: &str = "\
namespace go demo

struct TestStruct {
  1: string name,
  2: i32 id
}
service TestService {
  TestStruct getTest(1: i32 id),
}
";

pub const FULL_FILE: &str = r#"// Demo service definitions
include "shared.thrift"
cpp_include "<vector>"
namespace go demo.api
namespace * demo

const i32 MAX_USERS = 100
const list<string> NAMES = ["a", "b"]
const map<string, i32> LIMITS = {
  "low": 1,
  "high": 10
}

typedef i64 UserId (go.type = "int64")

enum Status {
  ACTIVE = 1,
  DISABLED = 2 (deprecated = "true")
}

senum Legacy {
  "old",
  "older"
}

/* Users are
   the main entity */
struct User {
  1: required UserId id,
  2: optional string name = "anon" (go.tag = 'json:"name"'),
  3: list<map<string, i32>> scores,
} (table = "users")

union Payload {
  1: string text
  2: binary raw
}

exception NotFound {
  1: string message
}

service Base {
  void ping()
}

service UserService extends Base {
  User get(1: UserId id) throws (1: NotFound missing),
  oneway void touch(1: UserId id)
  list<User> all() (cached = "true")
}
"#;
