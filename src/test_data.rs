#[cfg(test)]
pub const POST_DATA: &str = r#"---
title: "Inside the Go scheduler: G, M and P"
date: 2021-03-14 20:15:00
categories:
  - Go
  - [Go, Runtime]
tags: [concurrency, scheduler, goroutine]
image: /images/gmp.png   # cover
pin: true
toc: yes
---
Goroutines are cheap, but somebody still has to decide which one runs next.

<!-- more -->

## The three letters

![G, M and P](gmp.png)

```go
go func() {
    fmt.Println("hello from a goroutine")
}()
```

## Work stealing

<img src="/images/steal.png" alt="stealing">

{% asset_img runqueue.png local and global run queues %}
"#;

#[cfg(test)]
pub const POST_DATA_TOML: &str = r#"+++
title = "Channels are not queues"
date = 2020-11-02T09:00:00
tags = ["channels", "csp"]
draft = false
+++

A channel is a synchronization point first.
"#;

#[cfg(test)]
pub const POST_DATA_TEXTED: &str = "<!--
[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
[DATE]: # (2022-04-02 12:05:00.000)
[AUTHOR]: # (thiago)
[TAGS]: # (rust threads)
-->

# Worker pools in practice
A pool keeps a fixed number of threads busy.

<!-- more -->

## Sizing the pool
";
