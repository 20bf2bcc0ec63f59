//! Rule text for the CQL statement grammar.

/// Name of the start rule.
pub const START_RULE: &str = "cqlStatement";

pub(crate) const TERMINALS: &str = r#"
JUNK ::= /[ \t\r\f\v\n]+/
       | /(--|\/\/)[^\n\r]*/
       | /(?s)\/\*.*?\*\//
       ;

<identifier> ::= /[a-z][a-z0-9_]*/ ;
<quotedName> ::= /"([^"]|"")+"/ ;
<stringLiteral> ::= /'([^']|'')*'/ ;
<uuid> ::= /[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}/ ;
<float> ::= /-?[0-9]+\.[0-9]+/ ;
<wholenumber> ::= /[0-9]+/ ;
<integer> ::= /-?[0-9]+/ ;
<boolean> ::= /true|false/ ;

<cident> ::= <identifier> | <quotedName> ;
<cfOrKsName> ::= <identifier> | <quotedName> ;
<term> ::= <stringLiteral> | <integer> | <float> | <uuid> | <boolean> ;
<propertyValue> ::= <stringLiteral> | <identifier> | <integer> | <float> ;
"#;

pub(crate) const UNCLOSED_STRING: &str = r#"/'([^']|'')*/"#;
pub(crate) const UNCLOSED_NAME: &str = r#"/"([^"]|"")*/"#;
pub(crate) const UNCLOSED_COMMENT: &str = r#"/(?s)\/\*.*/"#;

pub(crate) const STATEMENTS: &str = r#"
<cqlStatement> ::= <useStatement>
                 | <selectStatement>
                 | <insertStatement>
                 | <updateStatement>
                 | <deleteStatement>
                 | <truncateStatement>
                 | <batchStatement>
                 | <createKeyspaceStatement>
                 | <createColumnFamilyStatement>
                 | <createIndexStatement>
                 | <dropKeyspaceStatement>
                 | <dropColumnFamilyStatement>
                 | <dropIndexStatement>
                 | <alterTableStatement>
                 ;

<keyspaceName> ::= ksname=<cfOrKsName> ;
# The qualifier binding includes its "." and is cleared when skipped.
<columnFamilyName> ::= ksname=( <cfOrKsName> "." )? cfname=<cfOrKsName> ;

<consistencyLevel> ::= "ONE" | "TWO" | "THREE" | "QUORUM" | "ALL" | "ANY"
                     | "LOCAL_QUORUM" | "EACH_QUORUM" ;
<usingConsistency> ::= "USING" "CONSISTENCY" <consistencyLevel> ;

<useStatement> ::= "USE" <keyspaceName> ;
"#;

pub(crate) const SELECT: &str = r#"
<selectStatement> ::= "SELECT" <selectClause>
                        "FROM" <columnFamilyName>
                        <usingConsistency>?
                        ( "WHERE" <whereClause> )?
                        ( "ORDER" "BY" <orderByClause> )?
                        ( "LIMIT" limit=<wholenumber> )?
                    ;
<selectClause> ::= "*"
                 | "COUNT" "(" ( "*" | "1" ) ")"
                 | [colname]=<cident> ( "," [colname]=<cident> )*
                 ;
<whereClause> ::= <relation> ( "AND" <relation> )* ;
<relation> ::= [rel_lhs]=<cident> ( "=" | "<" | ">" | "<=" | ">=" ) rel_rhs=<term>
             | [rel_lhs]=<cident> "IN" "(" rel_rhs=<term> ( "," rel_rhs=<term> )* ")"
             ;
<orderByClause> ::= ordercol=<cident> ( "ASC" | "DESC" )? ;
"#;

pub(crate) const MODIFICATION: &str = r#"
<usingOption> ::= "CONSISTENCY" <consistencyLevel>
                | "TIMESTAMP" optval=<wholenumber>
                | "TTL" optval=<wholenumber>
                ;
<deleteOption> ::= "CONSISTENCY" <consistencyLevel>
                 | "TIMESTAMP" optval=<wholenumber>
                 ;

<insertStatement> ::= "INSERT" "INTO" <columnFamilyName>
                        "(" [colname]=<cident> ( "," [colname]=<cident> )* ")"
                        "VALUES" "(" [newval]=<term> ( "," [newval]=<term> )* ")"
                        ( "USING" [insertopt]=<usingOption> ( "AND" [insertopt]=<usingOption> )* )?
                    ;

<updateStatement> ::= "UPDATE" <columnFamilyName>
                        ( "USING" [updateopt]=<usingOption> ( "AND" [updateopt]=<usingOption> )* )?
                        "SET" <assignment> ( "," <assignment> )*
                        "WHERE" <whereClause>
                    ;
<assignment> ::= [update_col]=<cident> "=" update_val=<term> ;

<deleteStatement> ::= "DELETE" ( [delcol]=<cident> ( "," [delcol]=<cident> )* )?
                        "FROM" <columnFamilyName>
                        ( "USING" [delopt]=<deleteOption> ( "AND" [delopt]=<deleteOption> )* )?
                        "WHERE" <whereClause>
                    ;

<truncateStatement> ::= "TRUNCATE" <columnFamilyName> ;

<batchStatement> ::= "BEGIN" "BATCH" <usingConsistency>?
                       ( <batchMember> ";"? )+
                       "APPLY" "BATCH"
                   ;
<batchMember> ::= <insertStatement> | <updateStatement> | <deleteStatement> ;
"#;

pub(crate) const SCHEMA_CHANGES: &str = r#"
<createKeyspaceStatement> ::= "CREATE" ( "KEYSPACE" | "SCHEMA" ) ksname=<cfOrKsName>
                                "WITH" <ksProperty> ( "AND" <ksProperty> )*
                            ;
<ksProperty> ::= [optname]=<propertyName> "=" optval=<propertyValue> ;
<propertyName> ::= <identifier> ( ":" <identifier> )? ;

<createColumnFamilyStatement> ::= "CREATE" ( "COLUMNFAMILY" | "TABLE" )
                                    ksname=( <cfOrKsName> "." )? cfname=<cfOrKsName>
                                    "(" <columnDefinition> ( "," <columnDefinition> )*
                                        ( "," "PRIMARY" "KEY" "(" [pkey]=<cident> ( "," [pkey]=<cident> )* ")" )?
                                    ")"
                                    ( "WITH" <cfProperty> ( "AND" <cfProperty> )* )?
                                ;
<columnDefinition> ::= [newcolname]=<cident> <storageType> ( "PRIMARY" "KEY" )? ;
<cfProperty> ::= [propname]=<propertyName> "=" propval=<propertyValue>
               | "COMPACT" "STORAGE"
               ;

<simpleStorageType> ::= "ascii" | "bigint" | "blob" | "boolean" | "counter" | "decimal"
                      | "double" | "float" | "inet" | "int" | "text" | "timestamp"
                      | "timeuuid" | "uuid" | "varchar" | "varint"
                      | <stringLiteral>
                      ;
<storageType> ::= <simpleStorageType>
                | "list" "<" <simpleStorageType> ">"
                | "set" "<" <simpleStorageType> ">"
                | "map" "<" <simpleStorageType> "," <simpleStorageType> ">"
                ;

<createIndexStatement> ::= "CREATE" "INDEX" indexname=<identifier>? "ON" <columnFamilyName>
                             "(" idxcol=<cident> ")"
                         ;

<dropKeyspaceStatement> ::= "DROP" ( "KEYSPACE" | "SCHEMA" ) <keyspaceName> ;
<dropColumnFamilyStatement> ::= "DROP" ( "COLUMNFAMILY" | "TABLE" ) <columnFamilyName> ;
<dropIndexStatement> ::= "DROP" "INDEX" indexname=<identifier> ;

<alterTableStatement> ::= "ALTER" ( "COLUMNFAMILY" | "TABLE" ) <columnFamilyName> <alterInstructions> ;
<alterInstructions> ::= "ALTER" existcol=<cident> "TYPE" <storageType>
                      | "ADD" newcol=<cident> <storageType>
                      | "DROP" existcol=<cident>
                      | "WITH" <cfProperty> ( "AND" <cfProperty> )*
                      ;
"#;
